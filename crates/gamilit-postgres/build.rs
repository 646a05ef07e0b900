#![forbid(unsafe_code)]

/// `embed_migrations!` is a proc-macro and cannot track the migration
/// directory on its own, so the crate is rebuilt whenever it changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
