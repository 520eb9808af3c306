//! Scope and globals macros - the ergonomic recording surface.
//!
//! These fill in source location and module path at the call site, so a
//! scope knows which file opened it and which module-globals table it
//! belongs to without the caller spelling either out.

/// Open a named scope on the current thread, returning its RAII guard.
///
/// Bind the guard with `let`; the scope closes when it drops.
///
/// # Example
///
/// ```rust,ignore
/// fn transfer(amount: u32) {
///     let _scope = stacksnap::snap_scope!("transfer");
///     stacksnap::snap_record!(amount);
///     // ...
/// }
/// ```
///
/// `snap_scope!(module)` opens a module-scope frame instead: its locals are
/// the module globals, so the renderer skips the locals section for it.
#[macro_export]
macro_rules! snap_scope {
    (module) => {
        $crate::ScopeGuard::enter_module(file!(), line!(), module_path!())
    };
    ($name:expr) => {
        $crate::ScopeGuard::enter($name, file!(), line!(), module_path!())
    };
}

/// Record a local value into the innermost open scope.
///
/// `snap_record!(x)` records the variable under its own name;
/// `snap_record!(total = a + b)` records an expression under a chosen name.
/// Values are formatted with `Debug` at record time.
#[macro_export]
macro_rules! snap_record {
    ($name:ident) => {
        $crate::record(stringify!($name), $crate::ValueRepr::plain(&$name))
    };
    ($name:ident = $value:expr) => {
        $crate::record(stringify!($name), $crate::ValueRepr::plain(&$value))
    };
}

/// Register a global in the calling module's globals table.
///
/// ```rust,ignore
/// stacksnap::snap_global!(max_retries = 3);     // plain data value
/// stacksnap::snap_global!(fn reconnect);        // function, filtered in brief mode
/// stacksnap::snap_global!(mod serde_json);      // module, filtered in brief mode
/// stacksnap::snap_global!(type Config);         // type, filtered in brief mode
/// ```
#[macro_export]
macro_rules! snap_global {
    (fn $name:ident) => {
        $crate::globals::register(
            module_path!(),
            stringify!($name),
            $crate::ValueRepr::function(stringify!($name)),
        )
    };
    (mod $name:ident) => {
        $crate::globals::register(
            module_path!(),
            stringify!($name),
            $crate::ValueRepr::module(stringify!($name)),
        )
    };
    (type $name:ident) => {
        $crate::globals::register(
            module_path!(),
            stringify!($name),
            $crate::ValueRepr::type_object(stringify!($name)),
        )
    };
    ($name:ident = $value:expr) => {
        $crate::globals::register(
            module_path!(),
            stringify!($name),
            $crate::ValueRepr::plain(&$value),
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::value::ValueKind;

    #[test]
    fn test_snap_scope_and_record() {
        let _scope = snap_scope!("macro_fn");
        snap_record!(answer = 42);
        let n = 7;
        snap_record!(n);

        let frames = crate::scope::snapshot_frames(0).unwrap();
        assert_eq!(frames[0].code_name, "macro_fn");
        assert_eq!(frames[0].locals["answer"].repr, "42");
        assert_eq!(frames[0].locals["n"].repr, "7");
        assert!(frames[0].file_name.ends_with("macros.rs"));
    }

    #[test]
    fn test_snap_scope_module() {
        let _scope = snap_scope!(module);
        let frames = crate::scope::snapshot_frames(0).unwrap();
        assert!(frames[0].module_scope);
    }

    #[test]
    fn test_snap_global_kinds() {
        snap_global!(limit = 10);
        snap_global!(fn restart);
        snap_global!(mod serde);
        snap_global!(type Options);

        let entries = crate::globals::module_globals(module_path!()).entries();
        assert_eq!(entries["limit"].kind, ValueKind::Plain);
        assert_eq!(entries["restart"].kind, ValueKind::Function);
        assert_eq!(entries["serde"].kind, ValueKind::Module);
        assert_eq!(entries["Options"].kind, ValueKind::Type);
    }
}
