use crate::request::Schema;

/// Trait for types that can describe their shape as a [`Schema`].
///
/// Tool input types implement this so their JSON Schema can be sent to the
/// model alongside the tool's name and description.
///
/// # Example
///
/// ```
/// use aria_llm::{Describe, Property, Schema};
///
/// struct WeatherInput {
///     city: String,
/// }
///
/// impl Describe for WeatherInput {
///     fn describe() -> Schema {
///         Schema::Object {
///             description: None,
///             properties: vec![Property {
///                 name: "city".into(),
///                 schema: Schema::String {
///                     description: Some("The name of the city".into()),
///                     enumeration: None,
///                 },
///             }],
///             required: vec!["city".into()],
///         }
///     }
/// }
/// ```
pub trait Describe {
    /// Return a [`Schema`] describing this type's structure.
    fn describe() -> Schema;
}

impl Describe for String {
    fn describe() -> Schema {
        Schema::String {
            description: None,
            enumeration: None,
        }
    }
}

impl Describe for bool {
    fn describe() -> Schema {
        Schema::Boolean { description: None }
    }
}

impl Describe for f64 {
    fn describe() -> Schema {
        Schema::Number { description: None }
    }
}

impl Describe for i64 {
    fn describe() -> Schema {
        Schema::Number { description: None }
    }
}

impl Describe for u32 {
    fn describe() -> Schema {
        Schema::Number { description: None }
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> Schema {
        Schema::Array {
            description: None,
            items: Box::new(T::describe()),
        }
    }
}
