/// Capability of rendering a value as text.
///
/// Only types implementing this trait are accepted where a URI or a query
/// parameter value may be built from an arbitrary object.
pub trait Stringable {
    fn render(&self) -> String;
}

impl Stringable for str {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl Stringable for String {
    fn render(&self) -> String {
        self.clone()
    }
}
