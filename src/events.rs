use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Pointer reactions a balloon subscribes to on its inner node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Pointer {
    Enter,
    Leave,
}

/// Direction of a visibility transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum Fade {
    In,
    Out,
}
