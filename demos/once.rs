extern crate mmdc;

use std::time::Duration;

use mmdc::{Instance, Mode};

fn main() {
	// Restrict counting to the GPU3D's first AXI port
	let gpu = mmdc::filter::lookup("gpu3d-a").unwrap();

	let mut set = mmdc::initialize(Some(gpu)).unwrap();

	// Counters are zeroed on start and frozen on stop
	let (first, second) = set.run_cycle(Duration::from_secs(1)).unwrap();

	println!("{}", mmdc::render(Instance::Mmdc0.tag(), &first, Mode::Human));
	if let Some(s) = second {
		println!("{}", mmdc::render(Instance::Mmdc1.tag(), &s, Mode::Human));
	}
}
