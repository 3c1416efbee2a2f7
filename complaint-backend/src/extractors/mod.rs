pub mod uuid;
pub mod validated;

pub use self::uuid::{ValidatedMultiPath, ValidatedUuid};
pub use self::validated::{ValidatedJson, ValidatedQuery};
