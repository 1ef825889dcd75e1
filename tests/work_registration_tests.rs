//! Work registration through the public API

use procthread::{
    is_invokable, message_for, register_work, unregister_work, Callable, ErrorCode,
    ProcessError, ProcessHandle, Work,
};

#[test]
fn test_set_work_then_get_work() {
    let work = Work::new(|(a, b): (u8, u8)| {
        let _ = a.wrapping_add(b);
    });
    let mut handle: ProcessHandle<(u8, u8)> = ProcessHandle::new();
    handle.set_work(Callable::from(work.clone())).unwrap();

    assert!(handle.work().unwrap().ptr_eq(&work));
}

#[test]
fn test_not_callable_error_carries_catalog_message() {
    let mut handle: ProcessHandle<(u8,)> = ProcessHandle::new();
    let err = handle
        .set_work(Callable::named("registration_nowhere"))
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::FunctionNotCallable));
    assert_eq!(err.to_string(), message_for(ErrorCode::FunctionNotCallable.as_i32()));
    assert!(handle.work().is_none());
}

#[test]
fn test_with_work_rejects_unknown_name() {
    let result = ProcessHandle::<()>::with_work(Callable::named("registration_unknown"));
    assert!(matches!(result, Err(ProcessError::NotCallable { .. })));
}

#[test]
fn test_static_check_matches_registration() {
    register_work("registration_greet", |name: String| {
        let _ = name.len();
    });

    let good = Callable::<String>::named("registration_greet");
    let wrong_args = Callable::<u64>::named("registration_greet");
    assert!(is_invokable(&good));
    assert!(ProcessHandle::<String>::is_invokable(&good));
    assert!(!ProcessHandle::<u64>::is_invokable(&wrong_args));

    let mut handle = ProcessHandle::<u64>::new();
    assert!(handle.set_work(wrong_args).is_err());

    assert!(unregister_work("registration_greet"));
    assert!(!is_invokable(&good));
}
