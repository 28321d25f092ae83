mod handler;

pub use handler::{codeforces_badge, dmoj_badge};
