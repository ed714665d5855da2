mod lint;

pub use self::lint::{cmd_lint, LintOptions, Services};
