#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingMassLossTable,
    BuildingCluster,
    RestoringSnapshot,
    RunningCluster,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadingMassLossTable => "loading mass-loss table",
            Self::BuildingCluster => "building cluster",
            Self::RestoringSnapshot => "restoring snapshot",
            Self::RunningCluster => "running",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterProgress {
    pub sim_time_yr: f64,
    pub t_end_yr: f64,
    pub fraction_complete: f64,
    pub step: usize,
    pub active_disks: usize,
    /// Encounters resolved in the last step
    pub encounters: usize,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub cluster: Option<ClusterProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            cluster: None,
        }
    }
}
