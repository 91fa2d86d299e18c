use std::io::Write;

use anyhow::Result;

use super::Row;

/// Write `rows` as CSV. The `Count` column is included only when requested.
pub fn render<W: Write>(rows: &[Row], out: W, show_count: bool) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(out);

    if show_count {
        writer.write_record(["Dependency", "Count", "RepoURL", "License"])?;
    } else {
        writer.write_record(["Dependency", "RepoURL", "License"])?;
    }

    for row in rows {
        let url = row.repo_url.as_deref().unwrap_or("");
        let license = row.license.as_deref().unwrap_or("");
        if show_count {
            let count = row.count.to_string();
            writer.write_record([row.dependency.as_str(), count.as_str(), url, license])?;
        } else {
            writer.write_record([row.dependency.as_str(), url, license])?;
        }
    }

    writer.flush()?;
    Ok(())
}
