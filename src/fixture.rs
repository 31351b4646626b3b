//! Fixtures for tests
use crate::model::Model;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A new model holding only the objects every model has
#[fixture]
pub fn model() -> Model {
    Model::new()
}
