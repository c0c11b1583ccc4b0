use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::info;
use crate::analysis::error::AnalysisError;
use crate::analysis::table::PeakTable;
use crate::analysis::SweepSet;
pub fn write_table_csv<W: Write>(table: &PeakTable, writer: W) -> Result<(), AnalysisError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(PeakTable::HEADER)?;
    for row in &table.rows {
        csv_writer.write_record(row.to_record())?;
    }
    csv_writer.flush()?;
    Ok(())
}
pub fn save_table_csv(table: &PeakTable, path: &Path) -> Result<(), AnalysisError> {
    write_table_csv(table, BufWriter::new(File::create(path)?))?;
    info!("peak table written to {}", path.display());
    Ok(())
}
pub fn save_table_json(table: &PeakTable, path: &Path) -> Result<(), AnalysisError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush()?;
    Ok(())
}
/// Store the cleaned sweeps in the instrument layout (rows = time points).
pub fn save_sweeps_json(sweeps: &SweepSet, path: &Path) -> Result<(), AnalysisError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &sweeps.to_rows())?;
    writer.flush()?;
    info!("sweep data stored in {}", path.display());
    Ok(())
}
pub fn save_png(png: &[u8], path: &Path) -> Result<(), AnalysisError> {
    fs::write(path, png)?;
    info!("plot written to {}", path.display());
    Ok(())
}
pub fn save_svg(svg: &str, path: &Path) -> Result<(), AnalysisError> {
    fs::write(path, svg)?;
    info!("plot written to {}", path.display());
    Ok(())
}
/// `<dir>/<label>.<extension>`, creating `dir` when needed.
pub fn output_path(dir: &Path, label: &str, extension: &str) -> Result<PathBuf, AnalysisError> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(format!("{label}.{extension}")))
}
