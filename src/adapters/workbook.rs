use crate::config::toml_config::SpreadsheetConfig;
use crate::domain::model::{KeywordRanks, KeywordRow, Rank};
use crate::domain::ports::RankSink;
use crate::utils::error::{RankError, Result};
use std::path::{Path, PathBuf};
use umya_spreadsheet::{reader, writer, Spreadsheet, Worksheet};

/// 工作表版面：標題列位置與各欄位的標題文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet: String,
    /// 0-based，工作表上的標題列為 `header_row + 1`
    pub header_row: u32,
    pub keyword_column: String,
    pub local_column: String,
    pub organic_column: String,
}

impl From<&SpreadsheetConfig> for SheetLayout {
    fn from(config: &SpreadsheetConfig) -> Self {
        Self {
            sheet: config.sheet.clone(),
            header_row: config.header_row,
            keyword_column: config.keyword_column.clone(),
            local_column: config.local_column.clone(),
            organic_column: config.organic_column.clone(),
        }
    }
}

/// 輸出欄位（1-based 欄號）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColumns {
    pub local: u32,
    pub organic: u32,
}

/// 資料列在工作表上的列號。`+2` 來自 1-based 列號與標題列本身。
pub fn excel_row(header_row: u32, row_index: u32) -> u32 {
    row_index + header_row + 2
}

fn open_book(path: &Path) -> Result<Spreadsheet> {
    // 先檢查檔案，讓找不到檔案時回報 IO 錯誤
    std::fs::metadata(path)?;
    Ok(reader::xlsx::read(path)?)
}

fn find_sheet<'a>(book: &'a Spreadsheet, name: &str) -> Result<&'a Worksheet> {
    book.get_sheet_by_name(name)
        .ok_or_else(|| RankError::SheetNotFound {
            sheet: name.to_string(),
        })
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> Option<String> {
    let cell = sheet.get_cell((col, row))?;
    let value = cell.get_value();
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 讀取關鍵字欄的所有非空白資料列
pub fn load_keywords(path: &Path, layout: &SheetLayout) -> Result<Vec<KeywordRow>> {
    let book = open_book(path)?;
    let sheet = find_sheet(&book, &layout.sheet)?;

    let header = layout.header_row + 1;
    let keyword_col = (1..=sheet.get_highest_column())
        .find(|&col| cell_text(sheet, col, header).as_deref() == Some(layout.keyword_column.as_str()))
        .ok_or_else(|| RankError::ColumnNotFound {
            label: layout.keyword_column.clone(),
        })?;

    let first_data_row = excel_row(layout.header_row, 0);
    let rows: Vec<KeywordRow> = (first_data_row..=sheet.get_highest_row())
        .filter_map(|row| {
            cell_text(sheet, keyword_col, row).map(|keyword| KeywordRow {
                keyword,
                row_index: row - first_data_row,
            })
        })
        .collect();

    tracing::info!(
        "✓ Loaded {} keywords from {} [{}]",
        rows.len(),
        path.display(),
        layout.sheet
    );
    Ok(rows)
}

/// 在標題列及其下一列中尋找輸出欄位（容許合併儲存格的雙層標題）
pub fn resolve_output_columns(sheet: &Worksheet, layout: &SheetLayout) -> Result<OutputColumns> {
    let local_label = layout.local_column.to_lowercase();
    let organic_label = layout.organic_column.to_lowercase();
    let header = layout.header_row + 1;

    let mut local = None;
    let mut organic = None;

    for row in [header, header + 1] {
        for col in 1..=sheet.get_highest_column() {
            let Some(text) = cell_text(sheet, col, row) else {
                continue;
            };
            let text = text.to_lowercase();
            if local.is_none() && text.contains(&local_label) {
                local = Some(col);
            }
            if organic.is_none() && text.contains(&organic_label) {
                organic = Some(col);
            }
        }
    }

    let local = local.ok_or_else(|| RankError::ColumnNotFound {
        label: layout.local_column.clone(),
    })?;
    let organic = organic.ok_or_else(|| RankError::ColumnNotFound {
        label: layout.organic_column.clone(),
    })?;

    Ok(OutputColumns { local, organic })
}

fn set_rank(sheet: &mut Worksheet, col: u32, row: u32, rank: Rank) {
    let cell = sheet.get_cell_mut((col, row));
    match rank {
        Rank::Found(position) => {
            cell.set_value_number(position);
        }
        Rank::NotFound => {
            cell.set_value_string(Rank::NOT_FOUND_TEXT);
        }
    }
}

/// 直接修改原始 xlsx 的排名寫入器。每次寫入都重新開檔、修改並存檔，保留既有格式。
#[derive(Debug, Clone)]
pub struct ExcelRankWriter {
    path: PathBuf,
    layout: SheetLayout,
}

impl ExcelRankWriter {
    pub fn new(path: impl Into<PathBuf>, layout: SheetLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 不寫入，只確認兩個輸出欄位存在
    pub fn check_columns(&self) -> Result<OutputColumns> {
        let book = open_book(&self.path)?;
        let sheet = find_sheet(&book, &self.layout.sheet)?;
        resolve_output_columns(sheet, &self.layout)
    }
}

impl RankSink for ExcelRankWriter {
    fn write_ranks(&self, row: &KeywordRow, ranks: &KeywordRanks) -> Result<u32> {
        let mut book = open_book(&self.path)?;
        let sheet = book
            .get_sheet_by_name_mut(&self.layout.sheet)
            .ok_or_else(|| RankError::SheetNotFound {
                sheet: self.layout.sheet.clone(),
            })?;

        let columns = resolve_output_columns(sheet, &self.layout)?;
        let target_row = excel_row(self.layout.header_row, row.row_index);

        set_rank(sheet, columns.local, target_row, ranks.local);
        set_rank(sheet, columns.organic, target_row, ranks.organic);

        writer::xlsx::write(&book, &self.path)?;

        tracing::debug!(
            "Updated row {}: {}={}, {}={}",
            target_row,
            self.layout.local_column,
            ranks.local,
            self.layout.organic_column,
            ranks.organic
        );
        Ok(target_row)
    }
}
