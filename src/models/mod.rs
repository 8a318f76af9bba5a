pub mod medium;
pub mod notice;
pub mod notice_setting;
pub mod notice_type;
pub mod user;

pub use medium::{Medium, NOTICE_MEDIA};
pub use notice::{Entity as Notice, Model as NoticeModel};
pub use notice_setting::{Entity as NoticeSetting, Model as NoticeSettingModel};
pub use notice_type::{Entity as NoticeType, Model as NoticeTypeModel};
pub use user::{Entity as User, Model as UserModel};
