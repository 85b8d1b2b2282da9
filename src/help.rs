pub const HELP_TEXT: &str = r#"

BASIC:
- rows
- columns
- summary
- head
- tail
- info
- shape
- sample
- count by clarity
- count by label

STATISTICS:
- min price
- max depth
- average carat
- median table

DISTINCT/UNIQUE:
- unique cuts
- distinct values
- distinct values for color

FILTERS:
- worst cut
- good cut
- best cut
- premium cut
- ideal cut
- ideal cut under 5000
- ideal cut above 10000
- ideal cut clarity si1 color d

RANKINGS:
- top 5 expensive diamonds
- top 10 cheap diamonds
- cheapest

GRAPHS: (need to specify type of graph)
- plot bar clarity vs depth
- plot scatter color
- plot histogram price
- plot box depth

"#;
