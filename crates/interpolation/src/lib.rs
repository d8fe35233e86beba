//! Piecewise-linear interpolation of flight telemetry streams.
//!
//! Turns each numeric field of a [`contracts::Stream`] into a continuous
//! function of time, so that streams sampled at different rates can be read
//! at any common timestamp.
//!
//! # Outside the data
//!
//! Queries before the first or after the last sample return
//! [`OUT_OF_DOMAIN_FILL`] (`0.0`). There is no extrapolation and no clamping
//! to the boundary value; callers that need to tell "no data" from a real
//! zero should check [`LinearInterpolator::contains`] or
//! [`FlightInterpolator::domain`] first.
//!
//! # Example
//!
//! ```
//! use contracts::{Stream, StreamSet};
//! use interpolation::InterpolationGroup;
//!
//! let streams: StreamSet = [
//!     Stream::from_numeric_rows("gps", &["alt"], [(0.0, [300.0]), (1.0, [320.0])]).unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let group = InterpolationGroup::build(&streams);
//! assert_eq!(group.value("gps", "alt", 0.5).unwrap(), 310.0);
//! ```

mod engine;
mod error;
mod group;
mod linear;

pub use engine::{FlightInterpolator, InterpolatedSample};
pub use error::{InterpError, Result};
pub use group::{InterpolationGroup, DEFAULT_MIN_SAMPLES};
pub use linear::{LinearInterpolator, OUT_OF_DOMAIN_FILL};
