//! Moves property declarations into the constructor signature as promoted
//! properties.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use styler_core::{Token, TokenKind, Tokens};

use crate::analyzer::{Analyzer, ConstructorAnalysis};
use crate::config::FixerConfig;

use super::{remove_with_lines_if_possible, Fixer, FixerError};

static DOCTRINE_ENTITY_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\*[ \t]+(@Document|@Entity|@Mapping\\Entity|@ODM\\Document|@ORM\\Entity|@ORM\\Mapping\\Entity)",
    )
    .unwrap()
});

static DOC_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*[ \t]*@[A-Za-z]").unwrap());

const VISIBILITY_KINDS: [TokenKind; 4] = [
    TokenKind::Private,
    TokenKind::Protected,
    TokenKind::Public,
    TokenKind::Var,
];

pub struct PromotedConstructorPropertyFixer;

impl Fixer for PromotedConstructorPropertyFixer {
    fn name(&self) -> &'static str {
        "promoted_constructor_property"
    }

    fn documentation(&self) -> &'static str {
        "Constructor properties must be promoted if possible."
    }

    fn sample_code(&self) -> &'static str {
        "<?php\nclass Foo {\n    private string $bar;\n    public function __construct(string $bar) {\n        $this->bar = $bar;\n    }\n}\n"
    }

    fn is_candidate(&self, tokens: &Tokens) -> bool {
        tokens.are_all_kinds_found(&[TokenKind::Class, TokenKind::Variable])
    }

    fn apply_fix(&self, tokens: &mut Tokens, _config: &FixerConfig) -> Result<(), FixerError> {
        let mut tokens_to_insert: BTreeMap<usize, Vec<Token>> = BTreeMap::new();

        for index in (1..tokens.len()).rev() {
            if !tokens[index].is_kind(TokenKind::Class) {
                continue;
            }

            let Some(analysis) = Analyzer::new(tokens).find_non_abstract_constructor(index)? else {
                continue;
            };

            promote_properties(tokens, index, &analysis, &mut tokens_to_insert)?;
        }

        // descending so earlier insertions keep their recorded offsets
        for (index, insert) in tokens_to_insert.into_iter().rev() {
            tokens.insert_at(index, insert);
        }
        Ok(())
    }
}

fn promote_properties(
    tokens: &mut Tokens,
    class_index: usize,
    analysis: &ConstructorAnalysis,
    tokens_to_insert: &mut BTreeMap<usize, Vec<Token>>,
) -> Result<(), FixerError> {
    let is_doctrine_entity = is_doctrine_entity(tokens, class_index);
    let properties = class_properties(tokens, class_index)?;

    let parameter_names = analysis.parameter_names().to_vec();
    let promotable_parameters = analysis.promotable_parameters().clone();
    let promotable_assignments = analysis.promotable_assignments().clone();

    for (&parameter_index, parameter_name) in &promotable_parameters {
        let Some(&assignment_index) = promotable_assignments.get(parameter_name) else {
            continue;
        };

        let Some(property_index) = find_property_index(tokens, &properties, assignment_index)?
        else {
            continue;
        };
        if !is_property_to_promote(tokens, property_index, is_doctrine_entity) {
            continue;
        }

        let property_type = type_before(tokens, property_index)?;
        let parameter_type = type_before(tokens, parameter_index)?;
        if !types_allow_promoting(&property_type, &parameter_type) {
            continue;
        }

        let assigned_property = tokens
            .prev_index_of(assignment_index - 1, |t| t.is_kind(TokenKind::Identifier))
            .ok_or(FixerError::ExpectedToken("assigned property name"))?;
        let old_parameter_name = tokens[parameter_index].content().to_string();
        let new_parameter_name = format!("${}", tokens[assigned_property].content());

        if old_parameter_name != new_parameter_name
            && parameter_names.contains(&new_parameter_name)
        {
            continue;
        }

        let insert = remove_property_and_collect_tokens(tokens, property_index)?;

        rename_variable(
            tokens,
            analysis.constructor_index(),
            &old_parameter_name,
            &new_parameter_name,
        )?;
        remove_assignment(tokens, assignment_index)?;
        record_parameter_signature(
            tokens,
            parameter_index,
            insert,
            property_type.starts_with('?'),
            tokens_to_insert,
        )?;
    }
    Ok(())
}

/// Property names of the class, without their `$`, mapped to the index of
/// the declaring variable token.
fn class_properties(
    tokens: &Tokens,
    class_index: usize,
) -> Result<BTreeMap<String, usize>, FixerError> {
    let open_brace = tokens
        .next_index_of(class_index + 1, |t| t.content() == "{")
        .ok_or(FixerError::ExpectedToken("class body"))?;
    let close_brace = tokens.find_block_end(open_brace)?;

    let mut properties = BTreeMap::new();
    let mut index = open_brace + 1;
    while index < close_brace {
        match tokens[index].content() {
            "(" | "[" | "#[" | "{" => index = tokens.find_block_end(index)?,
            content => {
                if tokens[index].is_kind(TokenKind::Variable) {
                    properties.insert(content[1..].to_string(), index);
                }
            }
        }
        index += 1;
    }
    Ok(properties)
}

/// The declared property matching the `$this->name` of an assignment.
fn find_property_index(
    tokens: &Tokens,
    properties: &BTreeMap<String, usize>,
    assignment_index: usize,
) -> Result<Option<usize>, FixerError> {
    let name_index = tokens
        .prev_index_of(assignment_index - 1, |t| t.is_kind(TokenKind::Identifier))
        .ok_or(FixerError::ExpectedToken("assigned property name"))?;

    Ok(properties.get(tokens[name_index].content()).copied())
}

fn is_doctrine_entity(tokens: &Tokens, index: usize) -> bool {
    let Some(doc_index) = tokens.prev_non_whitespace(index) else {
        return false;
    };
    tokens[doc_index].is_kind(TokenKind::DocComment)
        && DOCTRINE_ENTITY_ANNOTATION.is_match(tokens[doc_index].content())
}

/// In an entity class a property is only promoted when its doc block carries
/// no annotations; elsewhere every matched property qualifies.
fn is_property_to_promote(tokens: &Tokens, property_index: usize, is_doctrine_entity: bool) -> bool {
    if !is_doctrine_entity {
        return true;
    }

    let Some(doc_index) =
        tokens.prev_index_of(property_index - 1, |t| t.is_kind(TokenKind::DocComment))
    else {
        return true;
    };

    let owner = tokens.next_index_of(doc_index + 1, |t| {
        t.content() == "{" || t.is_kind(TokenKind::Variable)
    });
    if owner != Some(property_index) {
        return true;
    }

    !DOC_ANNOTATION.is_match(tokens[doc_index].content())
}

/// Concatenated type declaration preceding the variable at `index`, or an
/// empty string for an untyped one.
fn type_before(tokens: &Tokens, index: usize) -> Result<String, FixerError> {
    let boundary = tokens
        .prev_index_of(index - 1, |t| {
            t.content() == "("
                || t.content() == ","
                || t.content() == "]"
                || VISIBILITY_KINDS.contains(&t.kind())
        })
        .ok_or(FixerError::ExpectedToken("start of declaration"))?;

    let mut declared_type = String::new();
    let mut current = tokens
        .next_meaningful(boundary)
        .ok_or(FixerError::ExpectedToken("type or variable"))?;
    while current < index {
        declared_type.push_str(tokens[current].content());
        current = tokens
            .next_meaningful(current)
            .ok_or(FixerError::ExpectedToken("type or variable"))?;
    }
    Ok(declared_type)
}

fn types_allow_promoting(property_type: &str, parameter_type: &str) -> bool {
    if property_type.is_empty() {
        return true;
    }
    let property_type = property_type.strip_prefix('?').unwrap_or(property_type);
    let parameter_type = parameter_type.strip_prefix('?').unwrap_or(parameter_type);
    property_type.eq_ignore_ascii_case(parameter_type)
}

/// Clear the property declaration and return the tokens to re-insert in the
/// constructor signature, ending with its visibility (`var` becomes
/// `public`).
fn remove_property_and_collect_tokens(
    tokens: &mut Tokens,
    property_index: usize,
) -> Result<Vec<Token>, FixerError> {
    let visibility_index = tokens
        .prev_index_of(property_index - 1, |t| VISIBILITY_KINDS.contains(&t.kind()))
        .ok_or(FixerError::ExpectedToken("property visibility"))?;

    let prev_property_index =
        token_of_kind_sibling(tokens, -1, property_index, &["{", "}", ";", ","])?;
    let next_property_index = token_of_kind_sibling(tokens, 1, property_index, &[";", ","])?;

    let mut remove_from = (prev_property_index + 1..tokens.len())
        .find(|&i| {
            !tokens[i].is_empty()
                && !tokens[i].is_whitespace()
                && !tokens[i].is_kind(TokenKind::Comment)
        })
        .ok_or(FixerError::ExpectedToken("property declaration"))?;
    let mut remove_to = next_property_index;

    if tokens[prev_property_index].content() == "," {
        remove_from = prev_property_index;
        remove_to = property_index;
    } else if tokens[next_property_index].content() == "," {
        remove_from = tokens
            .prev_meaningful(property_index)
            .ok_or(FixerError::ExpectedToken("property declaration"))?
            + 1;
    }

    let mut insert: Vec<Token> = tokens
        .iter()
        .skip(remove_from)
        .take(visibility_index.saturating_sub(remove_from))
        .cloned()
        .collect();

    if tokens[visibility_index].is_kind(TokenKind::Var) {
        insert.push(Token::new(TokenKind::Public, "public"));
    } else {
        insert.push(tokens[visibility_index].clone());
    }

    tokens.clear_range(remove_from + 1, remove_to);
    remove_with_lines_if_possible(tokens, remove_from);

    Ok(insert)
}

fn rename_variable(
    tokens: &mut Tokens,
    constructor_index: usize,
    old_name: &str,
    new_name: &str,
) -> Result<(), FixerError> {
    let parentheses_open = tokens
        .next_index_of(constructor_index + 1, |t| t.content() == "(")
        .ok_or(FixerError::ExpectedToken("constructor parentheses"))?;
    let parentheses_close = tokens.find_block_end(parentheses_open)?;
    let brace_open = tokens
        .next_index_of(parentheses_close + 1, |t| t.content() == "{")
        .ok_or(FixerError::ExpectedToken("constructor body"))?;
    let brace_close = tokens.find_block_end(brace_open)?;

    for index in parentheses_open..brace_close {
        if tokens[index].equals(TokenKind::Variable, old_name) {
            tokens.set(index, Token::new(TokenKind::Variable, new_name))?;
        }
    }
    Ok(())
}

/// Clear a `$this->prop = $var;` statement, collapsing its line.
fn remove_assignment(tokens: &mut Tokens, assignment_index: usize) -> Result<(), FixerError> {
    let this_index = tokens
        .prev_index_of(assignment_index - 1, |t| t.is_kind(TokenKind::Variable))
        .ok_or(FixerError::ExpectedToken("$this"))?;
    let statement_end = tokens
        .next_index_of(assignment_index + 1, |t| t.content() == ";")
        .ok_or(FixerError::ExpectedToken(";"))?;

    tokens.clear_range(this_index + 1, statement_end);
    remove_with_lines_if_possible(tokens, this_index);
    Ok(())
}

/// Record the visibility tokens to insert before the parameter, switching
/// them to their promoted kinds and adding a `?` when the property type was
/// nullable.
fn record_parameter_signature(
    tokens: &Tokens,
    parameter_index: usize,
    mut insert: Vec<Token>,
    make_type_nullable: bool,
    tokens_to_insert: &mut BTreeMap<usize, Vec<Token>>,
) -> Result<(), FixerError> {
    let prev_element = tokens
        .prev_index_of(parameter_index - 1, |t| {
            t.content() == "(" || t.content() == "," || t.content() == "]"
        })
        .ok_or(FixerError::ExpectedToken("parameter boundary"))?;
    let parameter_start = tokens
        .next_meaningful(prev_element)
        .ok_or(FixerError::ExpectedToken("parameter"))?;

    for token in &mut insert {
        let promoted = match token.kind() {
            TokenKind::Public => Some(TokenKind::PromotedPublic),
            TokenKind::Protected => Some(TokenKind::PromotedProtected),
            TokenKind::Private => Some(TokenKind::PromotedPrivate),
            _ => None,
        };
        if let Some(kind) = promoted {
            *token = Token::new(kind, token.content());
        }
    }
    insert.push(Token::whitespace(" "));

    if make_type_nullable && !tokens[parameter_start].is_kind(TokenKind::NullableType) {
        insert.push(Token::new(TokenKind::NullableType, "?"));
    }

    tokens_to_insert.insert(parameter_start, insert);
    Ok(())
}

/// Nearest sibling in `direction` whose content is one of `contents`,
/// stepping over balanced blocks.
fn token_of_kind_sibling(
    tokens: &Tokens,
    direction: isize,
    index: usize,
    contents: &[&str],
) -> Result<usize, FixerError> {
    let mut current = index as isize + direction;

    while current >= 0 && (current as usize) < tokens.len() {
        let i = current as usize;
        if !tokens[i].is_empty() && contents.contains(&tokens[i].content()) {
            return Ok(i);
        }

        if let Ok((_, is_start)) = tokens.detect_block(i) {
            current = if is_start {
                tokens.find_block_end(i)? as isize
            } else {
                tokens.find_block_start(i)? as isize
            };
        }

        current += direction;
    }
    Err(FixerError::ExpectedToken("statement boundary"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixers::apply;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_promotes_matching_property() {
        let input = "<?php\nfinal class Example\n{\n    private string $name;\n\n    public function __construct(string $name)\n    {\n        $this->name = $name;\n    }\n}\n";
        let expected = "<?php\nfinal class Example\n{\n\n    public function __construct(private string $name)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_renames_parameter_to_property_name() {
        let input = "<?php\nclass Greeter\n{\n    private string $name;\n\n    public function __construct(string $n)\n    {\n        $this->name = $n;\n    }\n}\n";
        let expected = "<?php\nclass Greeter\n{\n\n    public function __construct(private string $name)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_var_property_becomes_public() {
        let input = "<?php\nclass Legacy\n{\n    var $value;\n\n    public function __construct($value)\n    {\n        $this->value = $value;\n    }\n}\n";
        let expected = "<?php\nclass Legacy\n{\n\n    public function __construct(public $value)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_nullable_property_type_adds_question_mark() {
        let input = "<?php\nclass Holder\n{\n    private ?string $label;\n\n    public function __construct(string $label)\n    {\n        $this->label = $label;\n    }\n}\n";
        let expected = "<?php\nclass Holder\n{\n\n    public function __construct(private ?string $label)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_skips_mismatched_types() {
        let code = "<?php\nclass Counter\n{\n    private int $count;\n\n    public function __construct(string $count)\n    {\n        $this->count = $count;\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, code), code);
    }

    #[test]
    fn test_skips_parameter_with_default_value() {
        let code = "<?php\nclass Holder\n{\n    private ?string $label;\n\n    public function __construct(?string $label = null)\n    {\n        $this->label = $label;\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, code), code);
    }

    #[test]
    fn test_skips_annotated_entity_property() {
        let code = "<?php\n/**\n * @ORM\\Entity\n */\nclass User\n{\n    /**\n     * @ORM\\Column\n     */\n    private string $email;\n\n    public function __construct(string $email)\n    {\n        $this->email = $email;\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, code), code);
    }

    #[test]
    fn test_skips_class_without_constructor() {
        let code = "<?php\nclass Plain\n{\n    private string $name;\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, code), code);
    }

    #[test]
    fn test_promotes_first_property_of_comma_joined_declaration() {
        let input = "<?php\nclass Pair\n{\n    private int $left, $right;\n\n    public function __construct(int $left)\n    {\n        $this->left = $left;\n    }\n}\n";
        let expected = "<?php\nclass Pair\n{\n    private int $right;\n\n    public function __construct(private int $left)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_promotes_second_property_of_comma_joined_declaration() {
        let input = "<?php\nclass Pair\n{\n    private int $left, $right;\n\n    public function __construct(int $right)\n    {\n        $this->right = $right;\n    }\n}\n";
        let expected = "<?php\nclass Pair\n{\n    private int $left;\n\n    public function __construct(private int $right)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_promotes_both_properties_of_comma_joined_declaration() {
        let input = "<?php\nclass Pair\n{\n    private int $left, $right;\n\n    public function __construct(int $left, int $right)\n    {\n        $this->left = $left;\n        $this->right = $right;\n    }\n}\n";
        let expected = "<?php\nclass Pair\n{\n\n    public function __construct(private int $left, private int $right)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }

    #[test]
    fn test_promotes_only_assigned_properties() {
        let input = "<?php\nclass Pair\n{\n    private int $left;\n    private int $right;\n\n    public function __construct(int $left, int $other)\n    {\n        $this->left = $left;\n    }\n}\n";
        let expected = "<?php\nclass Pair\n{\n    private int $right;\n\n    public function __construct(private int $left, int $other)\n    {\n    }\n}\n";
        assert_eq!(apply(&PromotedConstructorPropertyFixer, input), expected);
    }
}
