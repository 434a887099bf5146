mod bridge_tests {
    pub mod helpers;

    mod auth;
    mod lifecycle;
    mod protocol;
    mod scheduler;
    mod streaming;
}
