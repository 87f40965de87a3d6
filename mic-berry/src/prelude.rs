//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::volume::{LabelPlane, LabelPlaneMut, LabelVolume, Sample, SampleEncoding};
pub use crate::volume::{normalize_if_signed, normalize_signed16};

pub use crate::histogram::{Histogram1D, JointHistogram2D, LabelOutOfRange};

pub use crate::relabel::{correct_numbering, CompactionMap};

pub use crate::iou::{DegeneratePolicy, IouMatrix};

pub use crate::compare::{compact_and_compare, compare, CompareOptions, Comparison};

pub use crate::metrics::MatchSummary;

pub use crate::consts::{BACKGROUND, DEFAULT_MATCH_THRESHOLD};

pub use crate::{MicError, MicResult};
