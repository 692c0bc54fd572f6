use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sankey_rs_renderer::config::Config;
use sankey_rs_renderer::layout::compute_layout;
use sankey_rs_renderer::parser::parse_sankey;
use sankey_rs_renderer::render::render_svg;
use std::hint::black_box;

/// `layers` columns of `width` nodes, each node feeding every node of the next layer.
fn layered_source(layers: usize, width: usize) -> String {
    let mut out = String::from("title: bench\n");
    for layer in 0..layers.saturating_sub(1) {
        for from in 0..width {
            for to in 0..width {
                out.push_str(&format!(
                    "\"L{layer} N{from}\" --> \"L{} N{to}\": {}\n",
                    layer + 1,
                    (from + to) % 7 + 1
                ));
            }
        }
    }
    out
}

fn chain_source(hops: usize) -> String {
    let names: Vec<String> = (0..=hops).map(|idx| format!("S{idx}")).collect();
    format!("{}: 5 \"end\"\n", names.join(" --> "))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let energy = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/benches/fixtures/energy.sankey"
    ));
    group.bench_function("energy", |b| b.iter(|| parse_sankey(black_box(energy))));
    for (layers, width) in [(4, 4), (8, 8), (10, 16)] {
        let source = layered_source(layers, width);
        group.bench_with_input(
            BenchmarkId::new("layered", format!("{layers}x{width}")),
            &source,
            |b, source| b.iter(|| parse_sankey(black_box(source))),
        );
    }
    let chain = chain_source(500);
    group.bench_function("chain_500", |b| b.iter(|| parse_sankey(black_box(&chain))));
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("layout");
    for (layers, width) in [(4, 4), (8, 8), (10, 16)] {
        let graph = parse_sankey(&layered_source(layers, width)).expect("bench source parses");
        group.bench_with_input(
            BenchmarkId::new("layered", format!("{layers}x{width}")),
            &graph,
            |b, graph| b.iter(|| compute_layout(black_box(graph), &config.theme, &config.layout)),
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let config = Config::default();
    let source = layered_source(8, 8);
    c.bench_function("render/layered_8x8", |b| {
        b.iter(|| {
            let graph = parse_sankey(black_box(&source)).expect("bench source parses");
            let layout =
                compute_layout(&graph, &config.theme, &config.layout).expect("bench layout");
            render_svg(&layout, &config.theme, &config.render)
        })
    });
}

criterion_group!(benches, bench_parse, bench_layout, bench_end_to_end);
criterion_main!(benches);
