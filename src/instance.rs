#[derive(Debug, Clone, Copy, PartialEq)]
/// `Instance` names one of the two MMDC controllers of an i.MX6.
pub enum Instance {
	/// The first controller, present on every i.MX6 part.
	Mmdc0,

	/// The second controller, only used by boards with two DDR channels.
	///
	/// Single-channel boards leave it unclocked and its counters stay at zero.
	Mmdc1,
}

impl Instance {
	/// Both instances, in sampling order.
	pub const ALL: [Instance; 2] = [Instance::Mmdc0, Instance::Mmdc1];

	/// Physical base address of the instance's register block.
	pub fn base(self) -> u64 {
		match self {
			Instance::Mmdc0 => 0x021b_0000,
			Instance::Mmdc1 => 0x021b_4000,
		}
	}

	/// Tag printed in front of the instance's statistics.
	pub fn tag(self) -> &'static str {
		match self {
			Instance::Mmdc0 => "MMDC0",
			Instance::Mmdc1 => "MMDC1",
		}
	}
}
