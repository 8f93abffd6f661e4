use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 停駐視窗群組的位置。 / Position of a dockable window group around the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockRegion {
    Top,
    Left,
    Bottom,
    Right,
}

impl DockRegion {
    pub const ALL: [DockRegion; 4] = [
        DockRegion::Top,
        DockRegion::Left,
        DockRegion::Bottom,
        DockRegion::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DockRegion::Top => "top",
            DockRegion::Left => "left",
            DockRegion::Bottom => "bottom",
            DockRegion::Right => "right",
        }
    }

    /// 視窗管理器使用的群組代碼。 / Group code used by the host window manager.
    pub fn group_code(self) -> i32 {
        match self {
            DockRegion::Top => GROUP_TOP,
            DockRegion::Left => GROUP_LEFT,
            DockRegion::Bottom => GROUP_BOTTOM,
            DockRegion::Right => GROUP_RIGHT,
        }
    }
}

impl fmt::Display for DockRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown dock region `{0}`")]
pub struct ParseRegionError(pub String);

impl FromStr for DockRegion {
    type Err = ParseRegionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(DockRegion::Top),
            "left" => Ok(DockRegion::Left),
            "bottom" => Ok(DockRegion::Bottom),
            "right" => Ok(DockRegion::Right),
            _ => Err(ParseRegionError(value.to_string())),
        }
    }
}

pub const GROUP_TOP: i32 = 0;
pub const GROUP_LEFT: i32 = 1;
pub const GROUP_BOTTOM: i32 = 2;
pub const GROUP_RIGHT: i32 = 3;
pub const GROUP_FLOATING: i32 = 4;

/// 目前擁有焦點的區域。 / Region that currently owns keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusState {
    #[default]
    Editor,
    Top,
    Bottom,
    Left,
    Right,
}

impl FocusState {
    /// 將群組代碼轉換為焦點狀態；未知代碼視為編輯器。 / Maps a host group code; unknown codes (floating included) mean the editor.
    pub fn from_group_code(code: i32) -> Self {
        match code {
            GROUP_TOP => FocusState::Top,
            GROUP_LEFT => FocusState::Left,
            GROUP_BOTTOM => FocusState::Bottom,
            GROUP_RIGHT => FocusState::Right,
            _ => FocusState::Editor,
        }
    }

    pub fn region(self) -> Option<DockRegion> {
        match self {
            FocusState::Editor => None,
            FocusState::Top => Some(DockRegion::Top),
            FocusState::Bottom => Some(DockRegion::Bottom),
            FocusState::Left => Some(DockRegion::Left),
            FocusState::Right => Some(DockRegion::Right),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.region() {
            Some(region) => region.as_str(),
            None => "editor",
        }
    }
}

impl From<DockRegion> for FocusState {
    fn from(region: DockRegion) -> Self {
        match region {
            DockRegion::Top => FocusState::Top,
            DockRegion::Left => FocusState::Left,
            DockRegion::Bottom => FocusState::Bottom,
            DockRegion::Right => FocusState::Right,
        }
    }
}

impl fmt::Display for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusState {
    type Err = ParseRegionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("editor") {
            return Ok(FocusState::Editor);
        }
        value.parse::<DockRegion>().map(FocusState::from)
    }
}

/// 焦點移動方向。 / Direction of a "move focus" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Left,
    Right,
}

/// 目前版面中存在的停駐區域。 / Set of dock regions present in the current layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockLayout {
    regions: BTreeSet<DockRegion>,
}

impl DockLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        DockRegion::ALL.into_iter().collect()
    }

    pub fn contains(&self, region: DockRegion) -> bool {
        self.regions.contains(&region)
    }

    pub fn insert(&mut self, region: DockRegion) -> bool {
        self.regions.insert(region)
    }

    pub fn remove(&mut self, region: DockRegion) -> bool {
        self.regions.remove(&region)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DockRegion> + '_ {
        self.regions.iter().copied()
    }
}

impl FromIterator<DockRegion> for DockLayout {
    fn from_iter<I: IntoIterator<Item = DockRegion>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

/// 計算下一個取得焦點的區域。 / Computes the region that should receive focus next.
///
/// Returns `current` unchanged when there is nowhere to go. Only regions
/// present in `layout` (or the editor) are ever returned.
pub fn next_focus_target(
    current: FocusState,
    layout: &DockLayout,
    direction: FocusDirection,
) -> FocusState {
    let (near, far) = match direction {
        FocusDirection::Left => (DockRegion::Left, DockRegion::Right),
        FocusDirection::Right => (DockRegion::Right, DockRegion::Left),
    };

    match current.region() {
        Some(region) if region == far => FocusState::Editor,
        Some(region) if region == near => {
            if layout.contains(far) {
                far.into()
            } else {
                FocusState::Editor
            }
        }
        _ => {
            if layout.contains(near) {
                near.into()
            } else if layout.contains(far) {
                far.into()
            } else {
                current
            }
        }
    }
}

pub fn move_focus_left(current: FocusState, layout: &DockLayout) -> FocusState {
    next_focus_target(current, layout, FocusDirection::Left)
}

pub fn move_focus_right(current: FocusState, layout: &DockLayout) -> FocusState {
    next_focus_target(current, layout, FocusDirection::Right)
}

/// 視窗管理器提供的查詢與焦點介面。 / Window-manager surface the focus actions talk to.
pub trait DockHost {
    /// Whether anything currently owns keyboard focus in the application.
    fn has_focus_owner(&self) -> bool {
        true
    }

    fn has_group(&self, region: DockRegion) -> bool;

    /// Raw group code of the focused dockable group; anything unknown means the editor.
    fn focused_group(&self) -> i32;

    fn focus_group(&mut self, region: DockRegion);

    fn focus_editor(&mut self);

    fn layout(&self) -> DockLayout {
        DockRegion::ALL
            .into_iter()
            .filter(|region| self.has_group(*region))
            .collect()
    }
}

/// 「移動焦點」動作。 / The "move focus left/right" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveFocusAction {
    direction: FocusDirection,
}

impl MoveFocusAction {
    pub fn new(direction: FocusDirection) -> Self {
        Self { direction }
    }

    pub fn left() -> Self {
        Self::new(FocusDirection::Left)
    }

    pub fn right() -> Self {
        Self::new(FocusDirection::Right)
    }

    pub fn direction(&self) -> FocusDirection {
        self.direction
    }

    /// 執行焦點轉移並回傳目標。 / Transfers focus through the host and returns the target.
    ///
    /// Nothing happens when no component owns focus or when the target equals
    /// the current focus state.
    pub fn perform<H: DockHost + ?Sized>(&self, host: &mut H) -> Option<FocusState> {
        if !host.has_focus_owner() {
            return None;
        }
        let current = FocusState::from_group_code(host.focused_group());
        let layout = host.layout();
        let target = next_focus_target(current, &layout, self.direction);
        if target == current {
            debug!(
                "event=move_focus module=dock status=noop direction={:?} current={}",
                self.direction, current
            );
            return None;
        }
        debug!(
            "event=move_focus module=dock direction={:?} from={} to={}",
            self.direction, current, target
        );
        match target.region() {
            Some(region) => host.focus_group(region),
            None => host.focus_editor(),
        }
        Some(target)
    }
}
