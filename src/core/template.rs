//! Command templates: `${{ matrix.<axis> }}` placeholders substituted with the cell's values.
//! 命令模板：用单元的值替换 `${{ matrix.<axis> }}` 占位符。

use crate::core::models::Cell;

const OPEN: &str = "${{";
const CLOSE: &str = "}}";
const SCOPE: &str = "matrix.";

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Axis(&'a str),
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, String> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Literal(&rest[..start]));
        }
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or_else(|| format!("unterminated placeholder in '{template}'"))?;
        let expr = after_open[..end].trim();
        let axis = expr
            .strip_prefix(SCOPE)
            .filter(|axis| !axis.is_empty())
            .ok_or_else(|| format!("unsupported placeholder '{expr}', expected matrix.<axis>"))?;
        segments.push(Segment::Axis(axis));
        rest = &after_open[end + CLOSE.len()..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

/// Lists the axes a template refers to, or explains why it cannot be parsed.
/// 列出模板引用的轴，或说明无法解析的原因。
pub fn referenced_axes(template: &str) -> Result<Vec<&str>, String> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Axis(axis) => Some(axis),
            Segment::Literal(_) => None,
        })
        .collect())
}

/// Substitutes every placeholder with the cell's value. Templates are validated at load time,
/// so an unparsable template or unknown axis here is rendered verbatim.
///
/// 用单元的值替换每个占位符。模板在加载时已经过验证。
pub fn render(template: &str, cell: &Cell) -> String {
    let Ok(segments) = parse(template) else {
        return template.to_string();
    };
    let mut out = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Axis(axis) => match cell.value(axis) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str(OPEN);
                    out.push(' ');
                    out.push_str(SCOPE);
                    out.push_str(axis);
                    out.push(' ');
                    out.push_str(CLOSE);
                }
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_axes() {
        let axes = referenced_axes("tox -e ${{ matrix.python }} --os ${{matrix.os}}").unwrap();
        assert_eq!(axes, ["python", "os"]);
    }

    #[test]
    fn rejects_foreign_scopes() {
        assert!(referenced_axes("echo ${{ secrets.TOKEN }}").is_err());
        assert!(referenced_axes("echo ${{ matrix.os").is_err());
    }

    #[test]
    fn plain_shell_variables_are_left_alone() {
        assert_eq!(referenced_axes("echo ${HOME} $PATH").unwrap(), Vec::<&str>::new());
    }
}
