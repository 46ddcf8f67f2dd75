//! Column selectors for the `hdrs` table.
//!
//! `cols` is a string of letters, one per column. Uppercase picks the
//! absolute value of a statistic, lowercase its change relative to the
//! previous row.

/// A header-table column in its absolute or relative variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TotalsCol {
    HashAbs,
    TimeAbs,
    TimeRel,
    AgeAbs,
    AgeRel,
    DifficultyAbs,
    DifficultyRel,
    FeeAbs,
    FeeRel,
    KernelsAbs,
    KernelsRel,
    MwOutputsAbs,
    MwOutputsRel,
    MwInputsAbs,
    MwInputsRel,
    MwUtxosAbs,
    MwUtxosRel,
    ShOutputsAbs,
    ShOutputsRel,
    ShInputsAbs,
    ShInputsRel,
    ContractsActiveAbs,
    ContractsActiveRel,
    ContractCallsAbs,
    ContractCallsRel,
    SizeCompressedAbs,
    SizeCompressedRel,
    SizeArchiveAbs,
    SizeArchiveRel,
}

impl TotalsCol {
    /// Number of distinct columns; also the cap on a parsed selector.
    pub const COUNT: usize = 29;

    /// Columns used when the request has no `cols` argument.
    pub const DEFAULT: [TotalsCol; 10] = [
        TotalsCol::HashAbs,
        TotalsCol::TimeAbs,
        TotalsCol::DifficultyRel,
        TotalsCol::FeeRel,
        TotalsCol::KernelsRel,
        TotalsCol::MwOutputsRel,
        TotalsCol::MwInputsRel,
        TotalsCol::ShOutputsRel,
        TotalsCol::ShInputsRel,
        TotalsCol::ContractCallsRel,
    ];

    pub fn from_letter(ch: char) -> Option<Self> {
        use TotalsCol::*;
        let col = match ch {
            'H' => HashAbs,
            'T' => TimeAbs,
            't' => TimeRel,
            'G' => AgeAbs,
            'g' => AgeRel,
            'D' => DifficultyAbs,
            'd' => DifficultyRel,
            'F' => FeeAbs,
            'f' => FeeRel,
            'K' => KernelsAbs,
            'k' => KernelsRel,
            'O' => MwOutputsAbs,
            'o' => MwOutputsRel,
            'I' => MwInputsAbs,
            'i' => MwInputsRel,
            'U' => MwUtxosAbs,
            'u' => MwUtxosRel,
            'Z' => ShOutputsAbs,
            'z' => ShOutputsRel,
            'Y' => ShInputsAbs,
            'y' => ShInputsRel,
            'B' => ContractsActiveAbs,
            'b' => ContractsActiveRel,
            'P' => ContractCallsAbs,
            'p' => ContractCallsRel,
            'C' => SizeCompressedAbs,
            'c' => SizeCompressedRel,
            'A' => SizeArchiveAbs,
            'a' => SizeArchiveRel,
            _ => return None,
        };
        Some(col)
    }
}

/// Parse a `cols` argument. Unknown letters are skipped, and the list stops
/// growing once it holds [`TotalsCol::COUNT`] entries.
pub fn parse_columns(cols: Option<&str>) -> Vec<TotalsCol> {
    let Some(cols) = cols else {
        return TotalsCol::DEFAULT.to_vec();
    };
    cols.chars()
        .filter_map(TotalsCol::from_letter)
        .take(TotalsCol::COUNT)
        .collect()
}
