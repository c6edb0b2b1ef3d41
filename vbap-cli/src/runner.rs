use std::str::FromStr;

use clap::ArgMatches;
use log::{info, warn};
use serde::Serialize;
use vbap_lib::{
    find_ls_pairs, generate_gain_table_2d, generate_gain_table_2d_srcs, generate_gain_table_3d,
    generate_gain_table_3d_srcs, get_p_values, Direction, GainTable, LayoutFile, LayoutPreset,
    SourceGrid, VbapPanner,
};

use crate::cli;

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Exit code for a layout that cannot be triangulated.
const EXIT_DEGENERATE: i32 = 2;

pub fn run(args: &ArgMatches) -> CliResult<i32> {
    if let Some(code) = cli::bench::maybe_run_bench(args)? {
        return Ok(code);
    }

    match args.subcommand() {
        Some(("triangulate", sub)) => run_triangulate(sub),
        Some(("table", sub)) => run_table(sub),
        Some(("grid", sub)) => run_grid(sub),
        Some(("pvalues", sub)) => run_pvalues(sub),
        Some(("create", sub)) => run_create(sub),
        _ => Err("no command given; see --help".into()),
    }
}

/// Read a typed argument that has a default value.
pub fn required<T>(args: &ArgMatches, name: &str) -> CliResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .cloned()
        .ok_or_else(|| format!("missing argument --{}", name).into())
}

fn read_layout(args: &ArgMatches) -> CliResult<(LayoutFile, Vec<Direction>)> {
    let path = required::<String>(args, "INPUT")?;
    let layout = LayoutFile::from_path(&path)?;
    let loudspeakers = layout.resolved_loudspeakers();
    info!("Loaded {} loudspeakers from {}", loudspeakers.len(), path);
    Ok((layout, loudspeakers))
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct TriangulationReport {
    num_loudspeakers: usize,
    /// Loudspeakers followed by any pole dummies.
    directions: Vec<Direction>,
    /// Real loudspeaker index for each direction; `null` for dummies.
    index_map: Vec<Option<usize>>,
    groups: Vec<[usize; 3]>,
}

#[derive(Serialize)]
struct PairReport {
    num_loudspeakers: usize,
    pairs: Vec<[usize; 2]>,
}

fn run_triangulate(args: &ArgMatches) -> CliResult<i32> {
    let (layout, loudspeakers) = read_layout(args)?;

    if args.get_flag("2d") {
        let pairs = find_ls_pairs(&loudspeakers)?;
        print_json(&PairReport {
            num_loudspeakers: loudspeakers.len(),
            pairs,
        })?;
        return Ok(0);
    }

    let Some(panner) = VbapPanner::new(&loudspeakers, &layout.settings)? else {
        warn!("Layout cannot be triangulated");
        return Ok(EXIT_DEGENERATE);
    };
    print_json(&TriangulationReport {
        num_loudspeakers: panner.num_loudspeakers(),
        directions: panner.layout().directions().to_vec(),
        index_map: panner.layout().index_map().to_vec(),
        groups: panner.groups().to_vec(),
    })?;
    Ok(0)
}

fn run_table(args: &ArgMatches) -> CliResult<i32> {
    let (layout, loudspeakers) = read_layout(args)?;
    let mut settings = layout.settings;
    if let Some(&spread) = args.get_one::<f32>("spread") {
        settings.spread_deg = spread;
    }
    let az_res = required::<f32>(args, "az-res")?;
    let el_res = required::<f32>(args, "el-res")?;
    let use_grid = layout.sources.is_empty();

    let table = match (args.get_flag("2d"), use_grid) {
        (true, true) => generate_gain_table_2d(&loudspeakers, az_res)?,
        (true, false) => generate_gain_table_2d_srcs(&layout.sources, &loudspeakers)?,
        (false, true) => generate_gain_table_3d(&loudspeakers, az_res, el_res, &settings)?,
        (false, false) => generate_gain_table_3d_srcs(&layout.sources, &loudspeakers, &settings)?,
    };
    let Some(table) = table else {
        warn!("Layout cannot be triangulated");
        return Ok(EXIT_DEGENERATE);
    };
    info!(
        "Generated {} x {} gain table over {} groups",
        table.num_sources, table.num_loudspeakers, table.num_groups
    );

    print_table(table, args.get_flag("compress"), args.get_flag("interp"))?;
    Ok(0)
}

fn print_table(table: GainTable, compress: bool, interp: bool) -> CliResult<()> {
    match (compress, interp) {
        (true, true) => print_json(&table.compress().into_interp_table()),
        (true, false) => print_json(&table.compress()),
        (false, true) => print_json(&table.into_interp_table()),
        (false, false) => print_json(&table),
    }
}

#[derive(Serialize)]
struct GridReport {
    #[serde(flatten)]
    grid: SourceGrid,
    directions: Vec<Direction>,
}

fn run_grid(args: &ArgMatches) -> CliResult<i32> {
    let az_res = required::<f32>(args, "az-res")?;
    let grid = if args.get_flag("2d") {
        SourceGrid::horizontal(az_res)?
    } else {
        SourceGrid::new(az_res, required::<f32>(args, "el-res")?)?
    };
    print_json(&GridReport {
        directions: grid.directions(),
        grid,
    })?;
    Ok(0)
}

fn run_pvalues(args: &ArgMatches) -> CliResult<i32> {
    let dtt = required::<f32>(args, "dtt")?;
    let freqs: Vec<f32> = args
        .get_many::<f32>("freq")
        .map(|values| values.copied().collect())
        .unwrap_or_default();
    print_json(&get_p_values(dtt, &freqs)?)?;
    Ok(0)
}

fn run_create(args: &ArgMatches) -> CliResult<i32> {
    match args.subcommand() {
        Some(("layout-json", sub)) => {
            let name = required::<String>(sub, "preset")?;
            let preset = LayoutPreset::from_name(&name).ok_or_else(|| {
                let known: Vec<&str> = LayoutPreset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{}', expected one of: {}", name, known.join(", "))
            })?;
            let layout = LayoutFile {
                preset: None,
                loudspeakers: preset.directions(),
                sources: Vec::new(),
                settings: Default::default(),
            };
            print_json(&layout)?;
            Ok(0)
        }
        _ => Err("unknown create target".into()),
    }
}
