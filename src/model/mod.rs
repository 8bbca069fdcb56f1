//! Format-independent test results and their step trees

mod result;
mod step;

pub use result::{CanonicalResult, CurrentRun, Status};
pub use step::{decode_steps, encode_steps, StepNode};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
