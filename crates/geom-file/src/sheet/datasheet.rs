//! Schema-driven table decoding.

use std::fmt;

use geom_common::EndianReader;

use super::cell::Cell;
use super::schema::TableSchema;
use crate::{Error, Result};

/// One decoded data table.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSheet {
    address: u64,
    schema: TableSchema,
    rows: Vec<Vec<Cell>>,
}

impl DataSheet {
    /// Decode a table at the reader's position.
    ///
    /// Each row starts `row_size` bytes after the previous one. A row whose
    /// columns run past that boundary fails with [`Error::RowOverflow`].
    /// A schema without columns fails with [`Error::EmptyTableSchema`].
    pub fn read(reader: &mut EndianReader<'_>, schema: &TableSchema) -> Result<Self> {
        if schema.columns.is_empty() {
            return Err(Error::EmptyTableSchema {
                row_size: schema.row_size,
            });
        }

        let address = reader.position() as u64;
        let row_count = reader.read_i32()?.max(0) as usize;
        let row_size = schema.row_size as u64;

        let capacity = match row_size {
            0 => 0,
            n => row_count.min(reader.remaining() / n as usize),
        };
        let mut rows = Vec::with_capacity(capacity);

        let mut row_start = reader.position() as u64;
        for row in 0..row_count {
            let cells = schema
                .columns
                .iter()
                .map(|column| Cell::read(reader, column.ty))
                .collect::<Result<Vec<_>>>()?;

            let row_end = row_start + row_size;
            let position = reader.position() as u64;
            if position > row_end {
                return Err(Error::RowOverflow {
                    row,
                    row_start,
                    overflow: position - row_end,
                });
            }

            rows.push(cells);
            row_start = row_end;
            reader.seek(row_start as usize);
        }

        Ok(Self {
            address,
            schema: schema.clone(),
            rows,
        })
    }

    /// File offset of the row count.
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.columns.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Index of the column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.columns.iter().position(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    pub fn cell_by_name(&self, row: usize, column: &str) -> Option<&Cell> {
        self.cell(row, self.column_index(column)?)
    }

    /// Value of a named bit of a bitfield column.
    pub fn named_bit(&self, row: usize, column: &str, bit: &str) -> Option<bool> {
        let num = self.schema.bit_field(column)?.bit(bit)?;
        self.cell_by_name(row, column)?.bit(num)
    }

    /// Column count when every defined bit is shown as its own column.
    ///
    /// A bitfield column with bit definitions counts one column per bit plus
    /// a marker column on either side.
    pub fn full_column_count(&self) -> usize {
        self.schema
            .columns
            .iter()
            .map(|column| match self.schema.bit_field(&column.name) {
                Some(bits) if column.ty.is_bitfield() => bits.bits.len() + 2,
                _ => 1,
            })
            .sum()
    }

    /// Header, type and per-row value strings of every displayed column.
    fn grid(&self) -> Vec<GridColumn> {
        let mut grid = Vec::with_capacity(self.full_column_count());

        for (index, column) in self.schema.columns.iter().enumerate() {
            let cells = self.rows.iter().map(move |row| &row[index]);
            let bit_field = self
                .schema
                .bit_field(&column.name)
                .filter(|_| column.ty.is_bitfield());

            match bit_field {
                Some(bit_field) => {
                    let marker = GridColumn {
                        header: String::new(),
                        ty: column.ty.to_string(),
                        values: vec![String::new(); self.rows.len()],
                    };
                    grid.push(marker.clone());
                    for bit in &bit_field.bits {
                        grid.push(GridColumn {
                            header: bit.name.clone(),
                            ty: format!("bit_{}", bit.num),
                            values: cells
                                .clone()
                                .map(|cell| match cell.bit(bit.num) {
                                    Some(true) => "1".to_string(),
                                    _ => "0".to_string(),
                                })
                                .collect(),
                        });
                    }
                    grid.push(marker);
                }
                None => grid.push(GridColumn {
                    header: column.name.clone(),
                    ty: column.ty.to_string(),
                    values: cells.map(Cell::to_string).collect(),
                }),
            }
        }
        grid
    }
}

#[derive(Clone)]
struct GridColumn {
    header: String,
    ty: String,
    values: Vec<String>,
}

impl GridColumn {
    fn width(&self) -> usize {
        self.values
            .iter()
            .map(String::len)
            .chain([self.header.len(), self.ty.len()])
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for DataSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid();
        let widths: Vec<usize> = grid.iter().map(GridColumn::width).collect();

        for column in &grid {
            write!(f, "| {:<w$}", column.header, w = column.width() + 1)?;
        }
        writeln!(f, "|")?;
        for column in &grid {
            write!(f, "| {:<w$}", column.ty, w = column.width() + 1)?;
        }
        writeln!(f, "|")?;

        let total = widths.iter().sum::<usize>() + grid.len() * 3 + 1;
        writeln!(f, "{}", "-".repeat(total))?;

        for row in 0..self.rows.len() {
            for (column, width) in grid.iter().zip(&widths) {
                write!(f, "| {:<w$}", column.values[row], w = width + 1)?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geom_common::Endian;

    use super::*;
    use crate::sheet::schema::{BitFieldSchema, BitSchema, ColumnSchema, ScalarType};
    use crate::testing::ByteWriter;

    fn schema(row_size: u32) -> TableSchema {
        TableSchema::new(
            row_size,
            vec![
                ColumnSchema::new("id", ScalarType::U8),
                ColumnSchema::new("speed", ScalarType::Float),
                ColumnSchema::new("flags", ScalarType::BitFieldU8),
            ],
        )
        .with_bit_field(BitFieldSchema {
            field_name: "flags".to_string(),
            bits: vec![
                BitSchema {
                    num: 0,
                    name: "solid".to_string(),
                },
                BitSchema {
                    num: 2,
                    name: "visible".to_string(),
                },
            ],
        })
    }

    /// Two rows of `{u8, pad[3], f32, u8}` padded to 12 bytes, after a row count.
    fn table(endian: Endian) -> Vec<u8> {
        let mut w = ByteWriter::new(endian);
        w.i32(2);
        w.u8(1).zeros(3).f32(1.5).u8(0b101).zeros(3);
        w.u8(2).zeros(3).f32(-2.0).u8(0b001).zeros(3);
        w.finish()
    }

    #[test]
    fn test_read_rows() {
        for endian in [Endian::Big, Endian::Little] {
            let data = table(endian);
            let mut reader = EndianReader::new(&data, endian);
            let sheet = DataSheet::read(&mut reader, &schema(12)).unwrap();

            assert_eq!(sheet.row_count(), 2);
            assert_eq!(reader.position(), 4 + 24);
            assert_eq!(sheet.cell(0, 0).unwrap().as_u32(), 1);
            assert_eq!(sheet.cell(1, 1).unwrap().as_f32(), -2.0);
            assert_eq!(sheet.named_bit(0, "flags", "visible"), Some(true));
            assert_eq!(sheet.named_bit(1, "flags", "visible"), Some(false));
            assert_eq!(sheet.named_bit(1, "flags", "solid"), Some(true));
            assert_eq!(sheet.named_bit(1, "flags", "missing"), None);
            assert!(sheet.cell(2, 0).is_none());
            assert!(sheet.cell(0, 3).is_none());
        }
    }

    #[test]
    fn test_row_overflow() {
        let data = table(Endian::Big);
        let mut reader = EndianReader::new(&data, Endian::Big);
        let err = DataSheet::read(&mut reader, &schema(8)).unwrap_err();

        assert!(err.is_schema_mismatch());
        assert!(matches!(
            err,
            Error::RowOverflow { row: 0, row_start: 4, overflow: 1 }
        ));
    }

    #[test]
    fn test_empty_schema_is_rejected() {
        let mut w = ByteWriter::new(Endian::Big);
        w.i32(i32::MAX).zeros(8);
        let data = w.finish();

        let schema = TableSchema::new(4, Vec::new());
        let err = DataSheet::read(&mut EndianReader::new(&data, Endian::Big), &schema).unwrap_err();
        assert!(matches!(err, Error::EmptyTableSchema { row_size: 4 }));
        assert!(err.is_schema_mismatch());
    }

    #[test]
    fn test_huge_row_count_hits_end_of_data() {
        let mut w = ByteWriter::new(Endian::Little);
        w.i32(i32::MAX).u16(1).zeros(2).u16(2).zeros(2);
        let data = w.finish();

        let schema = TableSchema::new(4, vec![ColumnSchema::new("v", ScalarType::U16)]);
        let err = DataSheet::read(&mut EndianReader::new(&data, Endian::Little), &schema).unwrap_err();
        assert!(matches!(err, Error::Common(_)));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let data = table(Endian::Little);
        let a = DataSheet::read(&mut EndianReader::new(&data, Endian::Little), &schema(12)).unwrap();
        let b = DataSheet::read(&mut EndianReader::new(&data, Endian::Little), &schema(12)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trailing_padding_is_skipped() {
        let mut w = ByteWriter::new(Endian::Big);
        w.i32(2).u16(7).zeros(6).u16(9).zeros(6);
        let data = w.finish();

        let schema = TableSchema::new(8, vec![ColumnSchema::new("v", ScalarType::U16)]);
        let sheet = DataSheet::read(&mut EndianReader::new(&data, Endian::Big), &schema).unwrap();
        assert_eq!(sheet.cell(1, 0).unwrap().as_u32(), 9);
    }

    #[test]
    fn test_full_column_count() {
        let data = table(Endian::Big);
        let sheet = DataSheet::read(&mut EndianReader::new(&data, Endian::Big), &schema(12)).unwrap();
        // id, speed, marker, solid, visible, marker
        assert_eq!(sheet.full_column_count(), 6);
    }

    #[test]
    fn test_display_grid() {
        let data = table(Endian::Big);
        let sheet = DataSheet::read(&mut EndianReader::new(&data, Endian::Big), &schema(12)).unwrap();
        let text = sheet.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("| id "));
        assert!(lines[0].contains("| visible "));
        assert!(lines[1].contains("| bit_2 "));
        assert!(lines[2].chars().all(|c| c == '-'));
        assert_eq!(lines[2].len(), lines[0].len());
        assert!(lines[3].contains("| 1.500 "));
        assert!(lines[4].contains("| -2.000 "));
    }
}
