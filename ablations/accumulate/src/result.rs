//! 实验结果.

use crate::algos::Profile;
use std::io::{self, Write};

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    #[inline]
    fn u64_to_display(u: Option<u64>) -> String {
        match u {
            Some(u) => u.to_string(),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Rounds: {}", p.get_rounds())?;
    writeln!(w, "{S4}Voxels per round: {}", p.get_voxels())?;
    writeln!(w, "{S4}IoU matrix cells: {}", p.get_cells())?;
    writeln!(w, "{S4}Out-of-range voxels: {}", p.get_out_of_range())?;
    writeln!(w, "{S4}Effective total time: {} us", p.get_round_time_us())?;
    writeln!(
        w,
        "{S4}Effective average time: {} us",
        f64_to_display(p.get_avg_round_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    writeln!(
        w,
        "{S4}Matched objects (IoU > 0.5): {}",
        u64_to_display(p.get_matched())
    )?;
    writeln!(
        w,
        "{S4}Mean matched IoU: {}",
        f64_to_display(p.get_mean_matched_iou())
    )?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as u64);
    write!(w, "{S4}Most time-consuming round costs {} us", u64_to_display(t))?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut buf).expect("Writing into memory buffer error");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }

        self.cross_check();
    }

    /// 所有算法的匹配结果必须一致.
    fn cross_check(&self) {
        let mut it = self.data.iter();
        let Some((first, base)) = it.next() else {
            return;
        };
        for (key, p) in it {
            if p.get_matched() != base.get_matched() {
                log::error!(
                    "`{key}` matched {:?} objects, but `{first}` matched {:?}",
                    p.get_matched(),
                    base.get_matched()
                );
            }
        }
    }
}
