#![no_main]

use std::any::Any;
use std::rc::Rc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pulse_core::{Notification, Observer, Recorder, SubjectError};
use pulse_subject::{BehaviorSubject, Operand, Operation, Outcome, invoke};

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Next(i16),
    Return,
    Throw(u8),
    Subscribe,
    Unsubscribe(u8),
    ForeignCall(u8),
    ReentrantNext(i16),
}

fuzz_target!(|input: (i16, Vec<FuzzOp>)| {
    let (initial, ops) = input;
    let subject = BehaviorSubject::<i16, u8>::new(initial);
    let receiver: &dyn Any = &subject;
    let foreign = 0_u32;

    let mut model_value = initial;
    let mut terminated = false;
    let mut subs = Vec::new();

    for op in ops.into_iter().take(256) {
        match op {
            FuzzOp::Next(v) => {
                invoke::<i16, u8>(Some(receiver), Operation::Next, vec![Operand::Value(v)])
                    .expect("genuine receiver");
                if !terminated {
                    model_value = v;
                }
            }
            FuzzOp::Return => {
                invoke::<i16, u8>(Some(receiver), Operation::Return, Vec::new())
                    .expect("genuine receiver");
                terminated = true;
            }
            FuzzOp::Throw(e) => {
                invoke::<i16, u8>(Some(receiver), Operation::Throw, vec![Operand::Error(e)])
                    .expect("genuine receiver");
                terminated = true;
            }
            FuzzOp::Subscribe => {
                let rec = Recorder::<i16, u8>::new();
                let observer: Rc<dyn Observer<i16, u8>> = Rc::new(rec.clone());
                let outcome = invoke(
                    Some(receiver),
                    Operation::Subscribe,
                    vec![Operand::Observer(observer)],
                )
                .expect("genuine receiver");
                let log = rec.notifications();
                assert_eq!(log.first(), Some(&Notification::Next(model_value)));
                assert_eq!(log.len(), if terminated { 2 } else { 1 });
                if let Outcome::Subscribed(sub) = outcome {
                    subs.push(sub);
                }
            }
            FuzzOp::Unsubscribe(i) => {
                if !subs.is_empty() {
                    let index = usize::from(i) % subs.len();
                    subs.swap_remove(index).unsubscribe();
                }
            }
            FuzzOp::ForeignCall(kind) => {
                let operation = match kind % 5 {
                    0 => Operation::Value,
                    1 => Operation::Next,
                    2 => Operation::Return,
                    3 => Operation::Throw,
                    _ => Operation::Subscribe,
                };
                let err = invoke::<i16, u8>(Some(&foreign), operation, vec![Operand::Value(1)])
                    .expect_err("foreign receiver");
                assert!(matches!(err, SubjectError::InvalidReceiver { .. }));
            }
            FuzzOp::ReentrantNext(v) => {
                let inner = subject.clone();
                let observer = pulse_core::CallbackObserver::new().on_next(move |x: i16| {
                    if x != v {
                        inner.next(v);
                    }
                });
                let sub = subject.subscribe(observer);
                if !terminated {
                    model_value = v;
                }
                drop(sub);
            }
        }

        assert_eq!(subject.value(), model_value);
        assert_eq!(subject.is_terminal(), terminated);
    }
});
