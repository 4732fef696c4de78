pub const FULL: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "+git.",
    env!("MDTODO_GIT_SHA"),
    env!("MDTODO_GIT_DIRTY")
);
