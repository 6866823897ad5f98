//! polars DataFrame views of decoded captures.
//!
//! Only compiled with the `dataframe` feature. The decode outputs stay plain
//! vectors; these conversions exist for downstream analysis code that already
//! lives in DataFrame land.

use polars::prelude::*;

use crate::acq_decode::{AnalogTrace, DigitalTrace, MaxfindEvents, TdcEvents};

impl AnalogTrace {
    /// Columns `time` and `value`, the samples widened to i32.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let values: Vec<i32> = self.values.iter().map(|&v| i32::from(v)).collect();
        DataFrame::new(vec![
            Series::new("time".into(), &self.times).into(),
            Series::new("value".into(), values).into(),
        ])
    }
}

impl DigitalTrace {
    /// Columns `time` and `bit`.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        DataFrame::new(vec![
            Series::new("time".into(), &self.times).into(),
            Series::new("bit".into(), self.bits.clone()).into(),
        ])
    }
}

impl TdcEvents {
    /// Long format: columns `time` and `channel` (`"a"`, `"d1"`, `"d2"`).
    ///
    /// Rows are grouped per channel, time-ascending within each group.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let total = self.analog.len() + self.digital1.len() + self.digital2.len();
        let mut times = Vec::with_capacity(total);
        let mut channels = Vec::with_capacity(total);
        for (label, list) in [
            ("a", &self.analog),
            ("d1", &self.digital1),
            ("d2", &self.digital2),
        ] {
            times.extend_from_slice(list);
            channels.extend(std::iter::repeat(label).take(list.len()));
        }

        DataFrame::new(vec![
            Series::new("time".into(), times).into(),
            Series::new("channel".into(), channels).into(),
        ])
    }
}

impl MaxfindEvents {
    /// Columns `time` and `amplitude`, the amplitudes widened to u32.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let amplitudes: Vec<u32> = self.amplitudes.iter().map(|&a| u32::from(a)).collect();
        DataFrame::new(vec![
            Series::new("time".into(), &self.times).into(),
            Series::new("amplitude".into(), amplitudes).into(),
        ])
    }
}
