//! Sample project and report fixtures.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use jacoco_scala_acceptance::context::MixinFiltering;
use jacoco_scala_acceptance::report::REPORT_DIR;
use std::fs;
use tempfile::TempDir;

const POM_HEAD: &str = r#"<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>timezra.maven.jacoco.scala</groupId>
  <artifactId>example</artifactId>
  <version>1.0.0-SNAPSHOT</version>
  <build>
    <plugins>
      <plugin>
        <groupId>timezra.maven</groupId>
        <artifactId>jacoco-scala-maven-plugin</artifactId>
"#;

const POM_FILTERS: &str = r"        <configuration>
          <filters>
            <filter>SCALAC.MIXIN</filter>
          </filters>
        </configuration>
";

const POM_TAIL: &str = r"      </plugin>
    </plugins>
  </build>
</project>
";

/// Create a temporary directory with a UTF-8 path.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or its path is not
/// UTF-8.
pub fn utf8_temp_dir() -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create temp dir")?;
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| anyhow::anyhow!("temp dir {} is not UTF-8", path.display()))?;
    Ok((dir, path))
}

/// Lay out a project named `name` under `root` whose `pom.xml` filters
/// mixins when `filtering` says so.
///
/// # Errors
///
/// Returns an error when the directory or `pom.xml` cannot be written.
pub fn scala_project(
    root: &Utf8Path,
    name: &str,
    filtering: MixinFiltering,
) -> Result<Utf8PathBuf> {
    let project = root.join(name);
    fs::create_dir_all(project.as_std_path()).with_context(|| format!("create {project}"))?;
    let filters = match filtering {
        MixinFiltering::Filtered => POM_FILTERS,
        MixinFiltering::Unfiltered => "",
    };
    fs::write(
        project.join("pom.xml").as_std_path(),
        format!("{POM_HEAD}{filters}{POM_TAIL}"),
    )
    .with_context(|| format!("write pom.xml in {project}"))?;
    Ok(project)
}

/// Report HTML for `Example`, listing `thisIsMixedIn()` when `with_mixin`.
#[must_use]
pub fn report_html(with_mixin: bool) -> String {
    let mixin_row = if with_mixin {
        r#"<tr><td id="a1"><a href="Example.html#L5" class="el_method">thisIsMixedIn()</a></td></tr>"#
    } else {
        ""
    };
    format!(
        concat!(
            "<html><body><table>\n",
            r#"<tr><td id="a0"><a href="Example.html#L3" class="el_method">Example()</a></td></tr>"#,
            "\n{}\n</table></body></html>\n"
        ),
        mixin_row
    )
}

/// Write `contents` as the project's `Example.html` report.
///
/// # Errors
///
/// Returns an error when the report directory or file cannot be written.
pub fn write_report(project: &Utf8Path, contents: impl AsRef<[u8]>) -> Result<Utf8PathBuf> {
    let dir = project.join(REPORT_DIR);
    fs::create_dir_all(dir.as_std_path()).with_context(|| format!("create {dir}"))?;
    let path = dir.join("Example.html");
    fs::write(path.as_std_path(), contents).with_context(|| format!("write {path}"))?;
    Ok(path)
}
