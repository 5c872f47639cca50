//! FRIED grid of FUV-driven photoevaporation rates.
//!
//! The grid is a set of whitespace-separated text files (`*.dat`) with one
//! model per row:
//!
//! ```text
//! # m_star[MSun]  fuv[G0]  m_disk[MJup]  r_disk[AU]  log10(mdot[MSun/yr])
//! 0.1             10       0.1           5           -11.7
//! ```
//!
//! All rows together must cover a full rectilinear grid. Lookups interpolate
//! `log10 mdot` quadrilinearly in the log of each coordinate, clamping queries
//! to the tabulated range.

use std::fs;
use std::path::{Path, PathBuf};

use cd_core::units;

use crate::error::{PhotoError, PhotoResult};
use crate::mass_loss::MassLossTable;

const N_AXES: usize = 4;

/// Tabulated mass-loss rates on a rectilinear grid.
#[derive(Debug, Clone)]
pub struct FriedGrid {
    /// log10 of the axis values: stellar mass, FUV flux, disk mass, disk radius
    axes: [Vec<f64>; N_AXES],
    /// log10 mdot, row-major over `axes`
    log_mdot: Vec<f64>,
}

impl FriedGrid {
    /// Load every `*.dat` file in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> PhotoResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|_| PhotoError::MissingTable {
            path: dir.to_path_buf(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "dat"))
            .collect();
        if files.is_empty() {
            return Err(PhotoError::MissingTable {
                path: dir.to_path_buf(),
            });
        }
        files.sort();

        let mut rows = Vec::new();
        for path in &files {
            let text = fs::read_to_string(path).map_err(|source| PhotoError::Io {
                path: path.clone(),
                source,
            })?;
            parse_rows(path, &text, &mut rows)?;
        }
        Self::from_rows(&rows)
    }

    /// Build a grid from `[m_star, fuv, m_disk, r_disk, log10_mdot]` rows.
    pub fn from_rows(rows: &[[f64; 5]]) -> PhotoResult<Self> {
        if rows.is_empty() {
            return Err(PhotoError::IncompleteGrid {
                reason: "no grid points".into(),
            });
        }
        for row in rows {
            if row[..N_AXES].iter().any(|v| !(*v > 0.0)) || !row[N_AXES].is_finite() {
                return Err(PhotoError::IncompleteGrid {
                    reason: format!("grid point {row:?} has a non-positive coordinate"),
                });
            }
        }

        let axes: [Vec<f64>; N_AXES] = std::array::from_fn(|axis| {
            let mut values: Vec<f64> = rows.iter().map(|r| r[axis].log10()).collect();
            values.sort_by(f64::total_cmp);
            values.dedup();
            values
        });

        let size: usize = axes.iter().map(Vec::len).product();
        if size != rows.len() {
            return Err(PhotoError::IncompleteGrid {
                reason: format!(
                    "{} points for a {}x{}x{}x{} grid",
                    rows.len(),
                    axes[0].len(),
                    axes[1].len(),
                    axes[2].len(),
                    axes[3].len()
                ),
            });
        }

        let mut log_mdot = vec![f64::NAN; size];
        for row in rows {
            let mut flat = 0;
            for (axis, values) in axes.iter().enumerate() {
                // every coordinate came from some row, so the search hits
                let idx = values
                    .binary_search_by(|v| v.total_cmp(&row[axis].log10()))
                    .map_err(|_| PhotoError::IncompleteGrid {
                        reason: format!("coordinate {} missing from axis {axis}", row[axis]),
                    })?;
                flat = flat * values.len() + idx;
            }
            if !log_mdot[flat].is_nan() {
                return Err(PhotoError::IncompleteGrid {
                    reason: format!("duplicate grid point {:?}", &row[..N_AXES]),
                });
            }
            log_mdot[flat] = row[N_AXES];
        }

        Ok(Self { axes, log_mdot })
    }

    /// Number of tabulated values along each axis.
    pub fn shape(&self) -> [usize; N_AXES] {
        std::array::from_fn(|i| self.axes[i].len())
    }

    /// Interpolated `log10 mdot` for coordinates in table units
    /// (MSun, G0, MJup, AU).
    pub fn interpolate_log(&self, point: [f64; N_AXES]) -> f64 {
        let mut lower = [0usize; N_AXES];
        let mut weight = [0.0; N_AXES];
        for axis in 0..N_AXES {
            let (i, t) = bracket(&self.axes[axis], point[axis]);
            lower[axis] = i;
            weight[axis] = t;
        }

        let mut acc = 0.0;
        for corner in 0..(1 << N_AXES) {
            let mut w = 1.0;
            let mut flat = 0;
            for axis in 0..N_AXES {
                let upper = (corner >> axis) & 1 == 1;
                let len = self.axes[axis].len();
                let idx = if upper {
                    (lower[axis] + 1).min(len - 1)
                } else {
                    lower[axis]
                };
                w *= if upper { weight[axis] } else { 1.0 - weight[axis] };
                flat = flat * len + idx;
            }
            if w > 0.0 {
                acc += w * self.log_mdot[flat];
            }
        }
        acc
    }
}

impl MassLossTable for FriedGrid {
    fn lookup(&self, stellar_mass: f64, flux_g0: f64, disk_gas_mass: f64, disk_radius: f64) -> f64 {
        let point = [
            stellar_mass,
            flux_g0,
            units::msun_to_mjup(disk_gas_mass),
            disk_radius,
        ];
        10f64.powf(self.interpolate_log(point))
    }
}

/// Lower index and fractional position of `x` on a log axis, clamped.
fn bracket(axis: &[f64], x: f64) -> (usize, f64) {
    let lx = if x > 0.0 { x.log10() } else { f64::NEG_INFINITY };
    let last = axis.len() - 1;
    if last == 0 || lx <= axis[0] {
        if lx < axis[0] {
            tracing::debug!(value = x, "mass-loss lookup below grid, clamped");
        }
        return (0, 0.0);
    }
    if lx >= axis[last] {
        if lx > axis[last] {
            tracing::debug!(value = x, "mass-loss lookup above grid, clamped");
        }
        return (last - 1, 1.0);
    }
    let i = axis.partition_point(|v| *v <= lx) - 1;
    let t = (lx - axis[i]) / (axis[i + 1] - axis[i]);
    (i, t)
}

fn parse_rows(path: &Path, text: &str, rows: &mut Vec<[f64; 5]>) -> PhotoResult<()> {
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(PhotoError::Parse {
                path: path.to_path_buf(),
                line: n + 1,
                reason: format!("expected 5 columns, found {}", fields.len()),
            });
        }
        let mut row = [0.0; 5];
        for (slot, field) in row.iter_mut().zip(&fields) {
            *slot = field.parse::<f64>().map_err(|e| PhotoError::Parse {
                path: path.to_path_buf(),
                line: n + 1,
                reason: format!("{field:?}: {e}"),
            })?;
        }
        rows.push(row);
    }
    Ok(())
}
