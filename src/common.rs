#![allow(non_camel_case_types)]

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum SaoType {
    SAO_NOT_APPLIED = 0,
    SAO_BAND = 1,
    SAO_EDGE = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
pub enum PartMode {
    PART_2Nx2N = 0,
    PART_2NxN = 1,
    PART_Nx2N = 2,
    PART_NxN = 3,
    PART_2NxnU = 4,
    PART_2NxnD = 5,
    PART_nLx2N = 6,
    PART_nRx2N = 7,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum PredMode {
    MODE_INTER = 0,
    MODE_INTRA = 1,
    MODE_SKIP = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum InterPredIdc {
    PRED_L0 = 0,
    PRED_L1 = 1,
    PRED_BI = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum ScanType {
    SCAN_DIAG = 0,
    SCAN_HORIZ = 1,
    SCAN_VERT = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Mvd {
    pub x: i32,
    pub y: i32,
}
