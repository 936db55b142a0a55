//! Statistical helpers shared by the tilescan crates.
//!
//! - [`descriptive`]: mean, population standard deviation, median and range
//! - [`classification`]: safe ratios and precision / recall / F1 scores
//!
//! # Examples
//!
//! ```
//! use tilescan_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod classification;
pub mod descriptive;
