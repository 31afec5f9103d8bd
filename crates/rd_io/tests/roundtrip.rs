// crates/rd_io/tests/roundtrip.rs

//! 写出 → 读回 → 查询 的端到端测试

use rd_config::TerrainConfig;
use rd_geo::CoordinateProjector;
use rd_io::{
    export_dem, export_dem_to_configured_path, AsciiGridReader, AsciiGridWriter, DemSampler, ElevationSample, IoError,
};
use rd_terrain::reference::thames_profile;
use rd_terrain::{Grid, GridSpec};

fn small_config() -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.region.min_lon = -0.35;
    config.region.max_lon = -0.10;
    config.region.min_lat = 51.44;
    config.region.max_lat = 51.52;
    config.grid.cell_size = 100.0;
    config
}

#[test]
fn thames_export_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out").join("thames.asc");

    let config = small_config();
    let crs = config.region.crs().unwrap();
    let output = export_dem(config, &thames_profile(), &path).unwrap();
    assert!(path.exists());

    let parsed = AsciiGridReader::read(&path).unwrap();
    assert_eq!(parsed.nodata, -9999.0);
    assert_eq!(parsed.grid.spec(), output.grid.spec());
    assert_eq!(parsed.grid.count_unset(), 0);
    for (a, b) in parsed.grid.data().iter().zip(output.grid.data()) {
        assert!((a - b).abs() <= 0.005 + 1e-9, "{a} vs {b}");
    }

    // 按河道点的经纬度查询，得到该河道单元的高程
    let sampler = DemSampler::new(parsed.grid, CoordinateProjector::new(crs).unwrap());
    let profile = thames_profile();
    let mut sampled = 0;
    for (cp, projected) in profile.points().iter().zip(output.river.points()) {
        let Some(cell) = projected.cell else { continue };
        let expected = output.grid.at(cell).unwrap();
        match sampler.sample(&cp.location).unwrap() {
            ElevationSample::Value(v) => assert!((v - expected).abs() <= 0.005 + 1e-9),
            other => panic!("控制点 {} 查询结果 {other:?}", cp.index),
        }
        sampled += 1;
    }
    assert!(sampled > 0);
    // 东段控制点在此范围之外
    assert!(output.river.skipped() > 0);
}

#[test]
fn fatal_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.asc");

    let mut config = small_config();
    config.grid.cell_size = -50.0;
    let err = export_dem(config, &thames_profile(), &path).unwrap_err();
    assert!(matches!(err, IoError::Terrain(ref e) if e.is_configuration()));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let spec = GridSpec::new(0.0, 0.0, 1.0, 2, 2).unwrap();
    let grid = Grid::filled(spec, 1.0);
    let err = AsciiGridWriter::default()
        .write(&grid, blocker.join("dem.asc"))
        .unwrap_err();
    assert!(matches!(err, IoError::Io { .. }));
}

#[test]
fn nodata_cells_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holes.asc");

    let spec = GridSpec::new(100.0, 200.0, 10.0, 3, 3).unwrap();
    let mut data = vec![5.5; 9];
    data[4] = f64::NAN;
    let grid = Grid::from_data(spec, data).unwrap();

    AsciiGridWriter::new(-32768.0, 1).write(&grid, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.lines().nth(7).unwrap().contains("-32768"));

    let parsed = AsciiGridReader::read(&path).unwrap();
    assert_eq!(parsed.nodata, -32768.0);
    assert_eq!(parsed.grid.count_unset(), 1);
    assert!(parsed.grid.get(1, 1).unwrap().is_nan());
    assert_eq!(parsed.grid.get(2, 2), Some(5.5));
}

#[test]
fn failed_write_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // 目标是已存在的目录，最后的改名一定失败
    let occupied = dir.path().join("occupied");
    std::fs::create_dir(&occupied).unwrap();

    let spec = GridSpec::new(0.0, 0.0, 1.0, 2, 2).unwrap();
    let err = AsciiGridWriter::default()
        .write(&Grid::filled(spec, 1.0), &occupied)
        .unwrap_err();
    assert!(matches!(err, IoError::Io { .. }));

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("occupied")]);
}

#[test]
fn rewrite_replaces_previous_raster() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dem.asc");
    let spec = GridSpec::new(0.0, 0.0, 1.0, 2, 2).unwrap();

    AsciiGridWriter::default().write(&Grid::filled(spec, 1.0), &path).unwrap();
    AsciiGridWriter::default().write(&Grid::filled(spec, 2.0), &path).unwrap();

    let parsed = AsciiGridReader::read(&path).unwrap();
    assert!(parsed.grid.data().iter().all(|&v| v == 2.0));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn export_uses_configured_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small_config();
    config.output.path = dir.path().join("configured").join("thames.asc");
    let path = config.output.path.clone();

    let output = export_dem_to_configured_path(config, &thames_profile()).unwrap();
    let parsed = AsciiGridReader::read(&path).unwrap();
    assert_eq!(parsed.grid.spec(), output.grid.spec());
}
