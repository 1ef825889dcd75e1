//! Property tests for catalog and registration invariants

use proptest::prelude::*;
use procthread::{message_for, register_work, Callable, ErrorCode, ProcessHandle, ERROR_CATALOG};

proptest! {
    #[test]
    fn test_unknown_codes_get_placeholder(code in any::<i32>()) {
        prop_assume!(ErrorCode::from_code(code).is_none());
        let message = message_for(code);
        prop_assert!(message.contains(&code.to_string()));
        prop_assert!(ERROR_CATALOG.iter().all(|entry| entry.message != message));
    }

    #[test]
    fn test_failed_registration_keeps_prior_work(suffix in "[a-z0-9]{1,16}") {
        let mut handle: ProcessHandle<(i32, i32, i32)> =
            ProcessHandle::with_work(Callable::func(|_: (i32, i32, i32)| {})).unwrap();
        let before = handle.work().cloned().unwrap();

        let name = format!("prop_unregistered_{}", suffix);
        prop_assert!(handle.set_work(Callable::named(name)).is_err());
        prop_assert!(handle.work().unwrap().ptr_eq(&before));
    }

    #[test]
    fn test_registered_names_resolve(suffix in "[a-z0-9]{1,16}") {
        let name = format!("prop_registered_{}", suffix);
        register_work(&name, |_: (i32,)| {});

        let mut handle: ProcessHandle<(i32,)> = ProcessHandle::new();
        prop_assert!(handle.set_work(Callable::named(name.clone())).is_ok());
        prop_assert_eq!(handle.work().and_then(|w| w.name()), Some(name.as_str()));
    }
}
