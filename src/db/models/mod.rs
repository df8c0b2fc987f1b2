mod member_record;

pub use member_record::{MemberRecord, Punishment, PunishmentKind, Warning};
