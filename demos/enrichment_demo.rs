use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    fabric_enrich::example_apps::run_enrichment_demo(std::env::args().skip(1))
}
