/// Round-trip a Sketch archive and report what changed.
///
/// This example demonstrates:
/// - Reading an archive into a node graph and asset store
/// - Printing read warnings and an outline of the pages
/// - Writing the graph back out
/// - Structurally comparing the copy with the original
use sketchpack::sketch::{self, CompareOptions, ReadOptions};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input.sketch> <output.sketch>", args[0]);
        eprintln!("Example: {} design.sketch copy.sketch", args[0]);
        std::process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];
    println!("Reading archive: {}", input);
    println!("{}", "=".repeat(80));

    let reader = sketch::ArchiveReader::new(ReadOptions::new().with_sidecar(false));
    let loaded = reader.read(input)?;

    let (width, height) = loaded.file.size();
    println!("Pages:    {}", loaded.file.pages.len());
    println!("Extent:   {}x{}", width, height);
    println!("Assets:   {}", loaded.assets.stats().summary());
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        println!("{}", "-".repeat(80));
        for warning in &loaded.warnings {
            println!("  {}", warning);
        }
        println!();
    }

    println!("Outline:");
    println!("{}", "-".repeat(80));
    print!("{}", sketch::pretty_print(&loaded.file));
    println!();

    let report = sketch::write(output, &loaded.file, &loaded.assets)?;
    println!("Wrote {} members to {}", report.members.len(), output);

    let copy = reader.read(output)?;
    let discrepancies = sketch::compare(&loaded.file, &copy.file, &CompareOptions::default());
    if discrepancies.is_empty() {
        println!("✓ Copy is structurally identical");
    } else {
        println!("Discrepancies:");
        for discrepancy in &discrepancies {
            println!("  {}", discrepancy);
        }
    }

    Ok(())
}
