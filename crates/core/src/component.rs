/// The core trait for defining components in Cascade.
///
/// A `Component` takes an input and produces an output.
/// Components are deterministic, always producing the same result for a
/// given input, which makes any state they evolve explicit: a stateful model
/// receives its previous state as part of the input and returns the next
/// state as part of the output.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use cascade_core::Component;
///
/// struct Gain(f64);
///
/// impl Component for Gain {
///     type Input = f64;
///     type Output = f64;
///     type Error = Infallible;
///
///     fn call(&self, input: f64) -> Result<f64, Self::Error> {
///         Ok(input * self.0)
///     }
/// }
///
/// assert_eq!(Gain(2.0).call(1.5).unwrap(), 3.0);
/// ```
pub trait Component {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the component with the given input and returns a result.
    ///
    /// # Errors
    ///
    /// Each component defines its own `Error` type, allowing it to determine
    /// what constitutes a failure within its domain.
    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
