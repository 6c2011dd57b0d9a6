//! Builds a small trapezoidal map and prints the kind of report the
//! structure is meant to feed: summary counts, the boundary of every
//! region and a labelled query path.
//!
//! Run with `cargo run --example trapezoid_report`.

use tzmap::{PointLocator, Result, TrapMap};

fn main() -> Result<()> {
    let mut map = TrapMap::new([0., 0.], [10., 10.])?;

    let segments = [
        ("S1", ("P1", [2., 2.]), ("Q1", [8., 8.])),
        ("S2", ("P2", [5., 1.]), ("Q2", [9., 2.])),
        ("S3", ("P3", [1., 6.]), ("Q3", [9.5, 9.])),
    ];
    for (name, (pname, p), (qname, q)) in segments {
        let p = map.add_point(pname, p);
        let q = map.add_point(qname, q);
        map.add_segment(name, p, q)?;
    }
    let region_count = map.assign_names();

    println!("Map built successfully:");
    println!("\t{} point(s)", map.point_count());
    println!("\t{} segment(s)", map.segment_count());
    println!("\t{} trapezoid(s)", region_count);
    println!();

    println!("Regions:");
    for (idx, trap) in map.trapezoids() {
        let rightp = trap
            .right_point()
            .expect("regions are complete after the build");
        println!(
            "\t{}: left={} right={} top={} bottom={}",
            map.node_label(idx),
            map.point(trap.left_point()).name(),
            map.point(rightp).name(),
            map.segment(trap.top()).name(),
            map.segment(trap.bottom()).name(),
        );
    }
    println!();

    let query = [6., 6.5];
    let path = map.traversal_path(&query);
    let labels: Vec<String> = path.iter().map(|&idx| map.node_label(idx)).collect();
    println!("Query {:?} follows {}", query, labels.join(" -> "));
    match map.locate_one(&query) {
        Some(idx) => println!("The point lies in {}", map.node_label(idx)),
        None => println!("The point lies outside the bounding box"),
    }

    Ok(())
}
