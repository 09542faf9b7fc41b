pub mod attendance_record;
pub mod attendance_session;
pub mod jemaat;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_session::Entity as AttendanceSession;
pub use jemaat::Entity as Jemaat;

use sea_orm::sea_query::LikeExpr;

/// Lowercased `%needle%` pattern in which `%`, `_` and `\` from the needle
/// match literally.
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}
