pub mod account;
pub mod class;
pub mod entry;
pub mod pagination;
pub mod validation;

pub use account::{CreateAccountForm, Email, NewPassword, SignInForm, MAX_PASSWORD_LENGTH};
pub use class::{Class, ClassForm, ClassName, PrizeMoney};
pub use entry::{EditEntryForm, Entry, HorseName, HorseNumber, NewEntryForm, RiderName};
pub use pagination::{Offset, Page, PageParams, Paginated, PAGE_SIZE};
pub use validation::ValidationError;
