//! In-place constant folding over compiled instruction streams.
//!
//! A single forward scan rewrites runs of instructions whose result is known
//! at compile time into one `Push`, compacting the stream as it goes. Two
//! counters drive the pass: the scan index `i`, and `died`, the number of
//! instructions elided so far. Slots `[0, i - died)` always hold the
//! already-compacted live prefix, so backward-looking operand positions are
//! expressed in compacted coordinates (`i - died - 1` and so on), not in the
//! original ones.

use crate::bytecode::fold::FoldRegistry;
use crate::bytecode::op::Instr;
use crate::lang::value::Value;

/// Logical instruction kinds, as seen by the folding pass.
///
/// `GetVariable` splits in two (`CallNular` vs `GetVariable`) and `Assign`
/// splits by scope flag; everything else maps one-to-one from [`Instr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    EndStatement,
    Push,
    CallUnary,
    CallBinary,
    AssignLocal,
    Assign,
    CallNular,
    GetVariable,
    MakeArray,
}

/// Classify an instruction.
///
/// Pure, except for one context-dependent case: a `GetVariable` is a nular
/// constant call when the registry carries a binding for its name, and a
/// plain variable read otherwise.
pub fn classify(folds: &FoldRegistry, instr: &Instr) -> Kind {
    match instr {
        Instr::EndStatement => Kind::EndStatement,
        Instr::Push(_) => Kind::Push,
        Instr::CallUnary(_) => Kind::CallUnary,
        Instr::CallBinary(_) => Kind::CallBinary,
        Instr::Assign { local: true, .. } => Kind::AssignLocal,
        Instr::Assign { local: false, .. } => Kind::Assign,
        Instr::GetVariable(name) => {
            if folds.has_nular(name) {
                Kind::CallNular
            } else {
                Kind::GetVariable
            }
        }
        Instr::MakeArray(_) => Kind::MakeArray,
    }
}

/// True iff the instruction denotes a compile-time-known value: a literal
/// push, or a registered nular read. Calls are not constant until folded.
pub fn is_const(folds: &FoldRegistry, instr: &Instr) -> bool {
    matches!(classify(folds, instr), Kind::Push | Kind::CallNular)
}

/// Extract the value of an instruction certified by [`is_const`].
///
/// # Panics
///
/// Panics on any non-constant instruction. Callers must check [`is_const`]
/// first; reaching the panic means the folding pass itself is broken, not
/// that the input was bad.
pub fn const_value(folds: &FoldRegistry, instr: &Instr) -> Value {
    match instr {
        Instr::Push(value) => value.clone(),
        Instr::GetVariable(name) => match folds.nular_value(name) {
            Some(value) => value.clone(),
            None => panic!("constant extraction on unregistered variable read '{}'", name),
        },
        other => panic!("constant extraction on non-constant instruction {:?}", other),
    }
}

/// Fold constant runs in `instrs`, in place.
///
/// Per instruction, ascending:
///
/// - `MakeArray(0)` becomes `Push([])` outright.
/// - `MakeArray(n)` inspects its dependency window, the `n` instructions
///   immediately before it in compacted coordinates. If every window slot is
///   constant, their values become one pushed array and the window dies; one
///   non-constant slot aborts the fold and the instruction stays as-is.
/// - `CallUnary`/`CallBinary` ask the registry to fold over the one or two
///   preceding instructions; on success the operands die and the call
///   becomes a `Push` of the result.
/// - Regardless of kind, when `died > 0` the current slot is copied down to
///   `i - died`, shifting every survivor left over the dead slots.
///
/// The stream is then truncated to its live length, releasing the dead tail.
/// A window or operand position that would fall before the start of the
/// stream (malformed input) skips the fold rather than panicking.
pub fn optimize(folds: &FoldRegistry, instrs: &mut Vec<Instr>) {
    let count = instrs.len();
    let mut died = 0usize;

    for i in 0..count {
        match classify(folds, &instrs[i]) {
            Kind::MakeArray => {
                let size = match &instrs[i] {
                    Instr::MakeArray(size) => *size,
                    _ => unreachable!("classified MakeArray"),
                };
                if size == 0 {
                    instrs[i] = Instr::Push(Value::Array(Vec::new()));
                } else if let Some(start) = (i - died).checked_sub(size) {
                    if (start..i - died).all(|j| is_const(folds, &instrs[j])) {
                        let elements: Vec<Value> = (start..i - died)
                            .map(|j| const_value(folds, &instrs[j]))
                            .collect();
                        died += size;
                        instrs[i] = Instr::Push(Value::Array(elements));
                    }
                }
            }
            Kind::CallUnary => {
                let folded = match &instrs[i] {
                    Instr::CallUnary(name) => (i - died)
                        .checked_sub(1)
                        .and_then(|operand| folds.try_fold_unary(name, &instrs[operand])),
                    _ => unreachable!("classified CallUnary"),
                };
                if let Some((consumed, value)) = folded {
                    died += consumed;
                    instrs[i] = Instr::Push(value);
                }
            }
            Kind::CallBinary => {
                let folded = match &instrs[i] {
                    Instr::CallBinary(name) => (i - died).checked_sub(2).and_then(|left| {
                        folds.try_fold_binary(name, &instrs[left], &instrs[left + 1])
                    }),
                    _ => unreachable!("classified CallBinary"),
                };
                if let Some((consumed, value)) = folded {
                    died += consumed;
                    instrs[i] = Instr::Push(value);
                }
            }
            _ => {}
        }

        // Compaction: shift the (possibly just-replaced) instruction left
        // over the slots freed so far.
        if died > 0 {
            instrs[i - died] = instrs[i].clone();
        }
    }

    // Everything past the compacted prefix is dead.
    instrs.truncate(count - died);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::value::Namespace;

    fn push(n: f64) -> Instr {
        Instr::Push(Value::Number(n))
    }

    fn unary(name: &str) -> Instr {
        Instr::CallUnary(name.to_string())
    }

    fn binary(name: &str) -> Instr {
        Instr::CallBinary(name.to_string())
    }

    fn get(name: &str) -> Instr {
        Instr::GetVariable(name.to_string())
    }

    fn optimized(instrs: Vec<Instr>) -> Vec<Instr> {
        let folds = FoldRegistry::with_builtins();
        let mut instrs = instrs;
        optimize(&folds, &mut instrs);
        instrs
    }

    // ============================================================
    // Classifier / evaluator
    // ============================================================

    #[test]
    fn test_classify_kinds() {
        let folds = FoldRegistry::with_builtins();
        assert_eq!(classify(&folds, &Instr::EndStatement), Kind::EndStatement);
        assert_eq!(classify(&folds, &push(1.0)), Kind::Push);
        assert_eq!(classify(&folds, &unary("sqrt")), Kind::CallUnary);
        assert_eq!(classify(&folds, &binary("mod")), Kind::CallBinary);
        assert_eq!(classify(&folds, &Instr::MakeArray(3)), Kind::MakeArray);
        assert_eq!(
            classify(
                &folds,
                &Instr::Assign {
                    name: "x".to_string(),
                    local: true,
                }
            ),
            Kind::AssignLocal
        );
        assert_eq!(
            classify(
                &folds,
                &Instr::Assign {
                    name: "x".to_string(),
                    local: false,
                }
            ),
            Kind::Assign
        );
    }

    #[test]
    fn test_classify_variable_read_vs_nular() {
        let folds = FoldRegistry::with_builtins();
        assert_eq!(classify(&folds, &get("globalnamespace")), Kind::CallNular);
        assert_eq!(classify(&folds, &get("x")), Kind::GetVariable);
    }

    #[test]
    fn test_is_const() {
        let folds = FoldRegistry::with_builtins();
        assert!(is_const(&folds, &push(1.0)));
        assert!(is_const(&folds, &get("sessionnamespace")));
        assert!(!is_const(&folds, &get("x")));
        assert!(!is_const(&folds, &unary("sqrt")));
        assert!(!is_const(&folds, &binary("mod")));
        assert!(!is_const(&folds, &Instr::EndStatement));
        assert!(!is_const(&folds, &Instr::MakeArray(0)));
    }

    #[test]
    fn test_const_value_of_nular() {
        let folds = FoldRegistry::with_builtins();
        assert_eq!(
            const_value(&folds, &get("parsernamespace")),
            Value::Namespace(Namespace::Parser)
        );
    }

    #[test]
    #[should_panic(expected = "non-constant instruction")]
    fn test_const_value_panics_on_call() {
        let folds = FoldRegistry::with_builtins();
        const_value(&folds, &unary("sqrt"));
    }

    #[test]
    #[should_panic(expected = "unregistered variable read")]
    fn test_const_value_panics_on_variable_read() {
        let folds = FoldRegistry::with_builtins();
        const_value(&folds, &get("x"));
    }

    // ============================================================
    // Unary / binary folding
    // ============================================================

    #[test]
    fn test_unary_fold() {
        assert_eq!(
            optimized(vec![push(16.0), unary("sqrt")]),
            vec![push(4.0)]
        );
    }

    #[test]
    fn test_binary_fold() {
        assert_eq!(
            optimized(vec![push(7.0), push(3.0), binary("mod")]),
            vec![push(1.0)]
        );
    }

    #[test]
    fn test_negative_sqrt_not_folded() {
        let instrs = vec![push(-4.0), unary("sqrt")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_unknown_operator_not_folded() {
        let instrs = vec![push(1.0), unary("shuffle")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_non_constant_operand_not_folded() {
        let instrs = vec![get("x"), unary("sqrt")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_binary_with_one_non_constant_operand_not_folded() {
        let instrs = vec![get("x"), push(3.0), binary("mod")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_fold_feeds_later_fold() {
        // mod folds to Push(1), which then feeds the sqrt fold.
        assert_eq!(
            optimized(vec![push(7.0), push(3.0), binary("mod"), unary("sqrt")]),
            vec![push(1.0)]
        );
    }

    #[test]
    fn test_nular_operand_folds_through_registry() {
        // Nular reads count as constants; a namespace is not a number, so
        // the handler's type guard rejects it and the call survives.
        let instrs = vec![get("globalnamespace"), unary("sqrt")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    // ============================================================
    // MakeArray folding
    // ============================================================

    #[test]
    fn test_zero_size_array() {
        assert_eq!(
            optimized(vec![Instr::MakeArray(0)]),
            vec![Instr::Push(Value::Array(Vec::new()))]
        );
    }

    #[test]
    fn test_array_of_constants() {
        assert_eq!(
            optimized(vec![push(1.0), push(2.0), Instr::MakeArray(2)]),
            vec![Instr::Push(Value::Array(vec![
                Value::Number(1.0),
                Value::Number(2.0),
            ]))]
        );
    }

    #[test]
    fn test_nular_as_array_element() {
        let m = Value::Namespace(Namespace::Global);
        assert_eq!(
            optimized(vec![
                get("globalnamespace"),
                get("globalnamespace"),
                Instr::MakeArray(2),
            ]),
            vec![Instr::Push(Value::Array(vec![m.clone(), m]))]
        );
    }

    #[test]
    fn test_array_abort_on_non_constant_element() {
        // One variable read in the window leaves the whole run untouched,
        // operands included.
        let instrs = vec![push(1.0), get("x"), Instr::MakeArray(2)];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_nested_array_fold() {
        // [[1, 2], 3]
        assert_eq!(
            optimized(vec![
                push(1.0),
                push(2.0),
                Instr::MakeArray(2),
                push(3.0),
                Instr::MakeArray(2),
            ]),
            vec![Instr::Push(Value::Array(vec![
                Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]),
                Value::Number(3.0),
            ]))]
        );
    }

    #[test]
    fn test_array_window_crossing_statement_end_aborts() {
        let instrs = vec![push(1.0), Instr::EndStatement, Instr::MakeArray(2)];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_array_window_before_stream_start_skipped() {
        // Malformed stream: the window would start before index 0. The fold
        // is skipped instead of panicking.
        let instrs = vec![push(1.0), Instr::MakeArray(2)];
        assert_eq!(optimized(instrs.clone()), instrs);

        let instrs = vec![Instr::MakeArray(3)];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_call_operands_before_stream_start_skipped() {
        let instrs = vec![unary("sqrt")];
        assert_eq!(optimized(instrs.clone()), instrs);

        let instrs = vec![push(1.0), binary("mod")];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    // ============================================================
    // Compaction
    // ============================================================

    #[test]
    fn test_survivors_shift_left() {
        assert_eq!(
            optimized(vec![push(2.0), push(2.0), binary("*"), get("x")]),
            vec![push(4.0), get("x")]
        );
    }

    #[test]
    fn test_statement_end_survives_between_folds() {
        assert_eq!(
            optimized(vec![
                push(16.0),
                unary("sqrt"),
                Instr::EndStatement,
                push(7.0),
                push(3.0),
                binary("mod"),
            ]),
            vec![push(4.0), Instr::EndStatement, push(1.0)]
        );
    }

    #[test]
    fn test_assignment_operand_folds() {
        let assign = Instr::Assign {
            name: "x".to_string(),
            local: true,
        };
        assert_eq!(
            optimized(vec![push(16.0), unary("sqrt"), assign.clone()]),
            vec![push(4.0), assign]
        );
    }

    #[test]
    fn test_array_window_in_compacted_coordinates() {
        // After [7 3 mod] dies, the MakeArray(2) window must cover the
        // folded Push(1) and the literal 5, in compacted positions.
        assert_eq!(
            optimized(vec![
                push(7.0),
                push(3.0),
                binary("mod"),
                push(5.0),
                Instr::MakeArray(2),
            ]),
            vec![Instr::Push(Value::Array(vec![
                Value::Number(1.0),
                Value::Number(5.0),
            ]))]
        );
    }

    // ============================================================
    // Whole-stream properties
    // ============================================================

    #[test]
    fn test_size_never_grows() {
        let streams = vec![
            vec![push(16.0), unary("sqrt")],
            vec![get("x"), unary("sqrt")],
            vec![push(1.0), get("x"), Instr::MakeArray(2)],
            vec![],
        ];
        for instrs in streams {
            let before = instrs.len();
            assert!(optimized(instrs).len() <= before);
        }
    }

    #[test]
    fn test_size_unchanged_when_nothing_folds() {
        let instrs = vec![
            get("x"),
            unary("sqrt"),
            Instr::EndStatement,
            get("y"),
            push(3.0),
            binary("mod"),
        ];
        assert_eq!(optimized(instrs.clone()), instrs);
    }

    #[test]
    fn test_idempotent() {
        let once = optimized(vec![
            push(7.0),
            push(3.0),
            binary("mod"),
            Instr::EndStatement,
            get("x"),
            push(2.0),
            binary("+"),
            Instr::EndStatement,
            get("globalnamespace"),
            push(1.0),
            Instr::MakeArray(2),
        ]);
        assert_eq!(optimized(once.clone()), once);
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(optimized(vec![]), vec![]);
    }

    #[test]
    fn test_empty_registry_leaves_stream_alone() {
        // Only MakeArray(0) folds without registry help.
        let folds = FoldRegistry::new();
        let mut instrs = vec![push(16.0), unary("sqrt"), get("globalnamespace")];
        let before = instrs.clone();
        optimize(&folds, &mut instrs);
        assert_eq!(instrs, before);
    }
}
