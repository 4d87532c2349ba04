//! Build script that re-triggers compilation when migrations change.
//!
//! `embed_migrations!` reads the SQL files at compile time, but Cargo does
//! not know about that implicit dependency. Emitting `rerun-if-changed`
//! keeps incremental builds in sync with new or edited migrations.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
