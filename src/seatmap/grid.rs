use serde::{Deserialize, Serialize};

/// Позиция ячейки в сетке зала.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Линейный индекс `row * col_count + col`.
    pub const fn index(self, col_count: usize) -> usize {
        self.row * col_count + self.col
    }

    pub const fn from_index(index: usize, col_count: usize) -> Self {
        Self {
            row: index / col_count,
            col: index % col_count,
        }
    }
}

/// Прямоугольная область сетки, границы включительно.
///
/// Всегда хранится нормализованной: `start <= end` покомпонентно,
/// независимо от порядка, в котором пользователь указал углы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRegion {
    start_pos: GridPos,
    end_pos: GridPos,
}

impl SelectionRegion {
    /// Прямоугольник между двумя произвольными углами.
    pub fn spanning(a: GridPos, b: GridPos) -> Self {
        Self {
            start_pos: GridPos::new(a.row.min(b.row), a.col.min(b.col)),
            end_pos: GridPos::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Вся сетка `rows x cols`. Для пустой сетки возвращает `None`.
    pub fn whole(rows: usize, cols: usize) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        Some(Self::spanning(GridPos::new(0, 0), GridPos::new(rows - 1, cols - 1)))
    }

    pub fn start(&self) -> GridPos {
        self.start_pos
    }

    pub fn end(&self) -> GridPos {
        self.end_pos
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        (self.start_pos.row..=self.end_pos.row).contains(&pos.row)
            && (self.start_pos.col..=self.end_pos.col).contains(&pos.col)
    }

    pub fn cell_count(&self) -> usize {
        (self.end_pos.row - self.start_pos.row + 1) * (self.end_pos.col - self.start_pos.col + 1)
    }

    /// Все позиции области, построчно.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (self.start_pos.row..=self.end_pos.row).flat_map(move |row| {
            (self.start_pos.col..=self.end_pos.col).map(move |col| GridPos::new(row, col))
        })
    }

    /// Линейные индексы всех ячеек области для сетки шириной `col_count`.
    pub fn indices(&self, col_count: usize) -> impl Iterator<Item = usize> + '_ {
        self.positions().map(move |pos| pos.index(col_count))
    }
}

// Углы во входных данных могут прийти в любом порядке, поэтому
// десериализация всегда проходит через нормализацию.
impl<'de> Deserialize<'de> for SelectionRegion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            start_pos: GridPos,
            end_pos: GridPos,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::spanning(raw.start_pos, raw.end_pos))
    }
}
