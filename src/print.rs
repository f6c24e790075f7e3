//! Console tables.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Cell, Col, Row, Table};

use crate::metrics::MetricsTable;

pub fn tabulate(metrics: &MetricsTable) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default().with(Separator(true)).with(MinWidth(20)),
            )];
            for column in metrics.columns() {
                cols.push(Col::new(
                    Styles::default()
                        .with(MinWidth(column.heading.len().max(10)))
                        .with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["Team".into()];
            for column in metrics.columns() {
                header_cells.push(column.heading.clone().into());
            }
            Row::new(
                Styles::default().with(Header(true)).with(Separator(true)),
                header_cells,
            )
        });

    for (index, label) in metrics.rows().iter().enumerate() {
        let mut row_cells = vec![Cell::new(Styles::default().with(HAlign::Left), label.clone().into())];
        for column in metrics.columns() {
            let value = match column.values[index] {
                Some(value) => format!("{value:.3}"),
                None => "-".into(),
            };
            row_cells.push(value.into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }

    table
}

#[cfg(test)]
mod tests {
    use stanza::renderer::console::Console;
    use stanza::renderer::Renderer;

    use crate::metrics::{Metrics, Stat};
    use crate::rating::HOME_FIELD_ADVANTAGE;
    use crate::testing::round_robin;

    use super::*;

    #[test]
    fn renders_every_row_and_column() {
        let metrics = Metrics::default()
            .compute(&round_robin(), &[Stat::Fisb, Stat::MaxL])
            .unwrap();
        let rendered = Console::default().render(&tabulate(&metrics)).to_string();
        for fragment in ["Team", "FISB", "Max-L", "A", "D", HOME_FIELD_ADVANTAGE, "1.850", "-1.400"] {
            assert!(rendered.contains(fragment), "{fragment} missing from\n{rendered}");
        }
    }
}
