use clap::ArgMatches;

use crate::runner::CliResult;

pub fn maybe_run_bench(args: &ArgMatches) -> CliResult<Option<i32>> {
    // Dispatches benchmark sub-modes and returns an exit code if handled.
    if args.get_flag("bench") {
        return run_single_bench(args);
    }
    if args.get_flag("bench-sweep") {
        return run_sweep_bench(args);
    }
    Ok(None)
}

#[cfg(feature = "bench")]
fn base_config(args: &ArgMatches) -> CliResult<vbap_lib::diagnostics::bench::TableBenchConfig> {
    use crate::runner::required;

    let resolution = required::<f32>(args, "bench-resolution")?;
    Ok(vbap_lib::diagnostics::bench::TableBenchConfig {
        num_loudspeakers: required::<usize>(args, "bench-loudspeakers")?,
        az_res_deg: resolution,
        el_res_deg: resolution,
        spread_deg: required::<f32>(args, "bench-spread")?,
        iterations: required::<usize>(args, "bench-iterations")?,
    })
}

fn run_single_bench(_args: &ArgMatches) -> CliResult<Option<i32>> {
    #[cfg(not(feature = "bench"))]
    {
        eprintln!("Benchmarking requires the `bench` feature.");
        return Ok(Some(1));
    }
    #[cfg(feature = "bench")]
    {
        let config = base_config(_args)?;
        let result = vbap_lib::diagnostics::bench::bench_gain_table(config)?;

        println!(
            "Table bench (loudspeakers={} res={}deg spread={}deg iters={}): avg {:.2}ms (min {:.2}ms max {:.2}ms), sources {}, groups {}, {:.2}us/source",
            config.num_loudspeakers,
            config.az_res_deg,
            config.spread_deg,
            config.iterations,
            result.avg_ms,
            result.min_ms,
            result.max_ms,
            result.num_sources,
            result.num_groups,
            result.per_source_us
        );

        return Ok(Some(0));
    }
}

fn run_sweep_bench(_args: &ArgMatches) -> CliResult<Option<i32>> {
    // Sweep a fixed list of layout sizes to see how triangle count scales.
    #[cfg(not(feature = "bench"))]
    {
        eprintln!("Benchmarking requires the `bench` feature.");
        return Ok(Some(1));
    }
    #[cfg(feature = "bench")]
    {
        let layout_sizes = [8, 16, 32, 64, 128];
        let base = base_config(_args)?;

        let results = vbap_lib::diagnostics::bench::bench_gain_table_sweep(base, &layout_sizes)?;
        println!(
            "Table sweep (res={}deg spread={}deg iters={})",
            base.az_res_deg, base.spread_deg, base.iterations
        );
        println!("speakers | groups | avg_ms | min_ms | max_ms | us/source");
        for (num_loudspeakers, result) in results {
            println!(
                "{:>8} | {:>6} | {:>6.2} | {:>6.2} | {:>6.2} | {:>9.2}",
                num_loudspeakers,
                result.num_groups,
                result.avg_ms,
                result.min_ms,
                result.max_ms,
                result.per_source_us
            );
        }

        return Ok(Some(0));
    }
}
