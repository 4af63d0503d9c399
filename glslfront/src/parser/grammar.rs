//! The productions of the grammar.
//!
//! Productions are written in the style described in the [parent module](super): most copy the incoming state,
//! work on the copy and commit it with `*ps = p` on success. Those that operate on the incoming state directly do
//! so deliberately, and are only ever called where a partial advance is harmless.

use super::{opcodes::*, NoMatch, ParseFlags, ParseState, Parser, Res, TokenSource};
use crate::{lexer::Token, parser::ShaderStage, pool::Symbol};

/// Signature shared by all productions, used to pass operands to [`Parser::binary()`].
type Production<P> = fn(&mut P, &mut ParseState) -> Res;

/// Operators which the built-in library may overload with `__operator`.
const OVERRIDABLE_OPERATORS: &[(Token, u8)] = &[
	(Token::Increment, OPERATOR_INCREMENT),
	(Token::AddAssign, OPERATOR_ADDASSIGN),
	(Token::Plus, OPERATOR_PLUS),
	(Token::Decrement, OPERATOR_DECREMENT),
	(Token::SubAssign, OPERATOR_SUBASSIGN),
	(Token::Minus, OPERATOR_MINUS),
	(Token::Not, OPERATOR_NOT),
	(Token::MulAssign, OPERATOR_MULASSIGN),
	(Token::Star, OPERATOR_MULTIPLY),
	(Token::DivAssign, OPERATOR_DIVASSIGN),
	(Token::Slash, OPERATOR_DIVIDE),
	(Token::LessEqual, OPERATOR_LESSEQUAL),
	(Token::Less, OPERATOR_LESS),
	(Token::GreaterEqual, OPERATOR_GREATEREQUAL),
	(Token::Greater, OPERATOR_GREATER),
	(Token::Xor, OPERATOR_LOGICALXOR),
];

const ASSIGNMENT_OPERATORS: &[(Token, u8)] = &[
	(Token::Assign, OP_ASSIGN),
	(Token::MulAssign, OP_MULASSIGN),
	(Token::DivAssign, OP_DIVASSIGN),
	(Token::AddAssign, OP_ADDASSIGN),
	(Token::SubAssign, OP_SUBASSIGN),
];

const PREFIX_OPERATORS: &[(Token, u8)] = &[
	(Token::Increment, OP_PREINCREMENT),
	(Token::Decrement, OP_PREDECREMENT),
	(Token::Plus, OP_PLUS),
	(Token::Minus, OP_MINUS),
	(Token::Not, OP_NOT),
];

/* BINARY OPERATORS, BY PRECEDENCE LEVEL */
const MULTIPLICATIVE: &[(Token, u8)] =
	&[(Token::Star, OP_MULTIPLY), (Token::Slash, OP_DIVIDE)];
const ADDITIVE: &[(Token, u8)] =
	&[(Token::Plus, OP_ADD), (Token::Minus, OP_SUBTRACT)];
const RELATIONAL: &[(Token, u8)] = &[
	(Token::Less, OP_LESS),
	(Token::Greater, OP_GREATER),
	(Token::LessEqual, OP_LESSEQUAL),
	(Token::GreaterEqual, OP_GREATEREQUAL),
];
const EQUALITY: &[(Token, u8)] =
	&[(Token::Equal, OP_EQUAL), (Token::NotEqual, OP_NOTEQUAL)];
const LOGICAL_AND: &[(Token, u8)] = &[(Token::And, OP_LOGICALAND)];
const LOGICAL_XOR: &[(Token, u8)] = &[(Token::Xor, OP_LOGICALXOR)];
const LOGICAL_OR: &[(Token, u8)] = &[(Token::Or, OP_LOGICALOR)];

impl<S: TokenSource> Parser<'_, S> {
	/// Consumes the first operator of `operators` found at the cursor, returning its opcode.
	fn operator(
		&mut self,
		ps: &mut ParseState,
		operators: &[(Token, u8)],
	) -> Option<u8> {
		for (token, op) in operators {
			if self.token(ps, *token).is_ok() {
				return Some(*op);
			}
		}
		None
	}

	/// Consumes `keyword` if it is next, returning whether it was. For keywords whose absence means the same as
	/// their presence, such as `in` on a parameter.
	fn skip_keyword(&mut self, ps: &mut ParseState, keyword: Symbol) -> bool {
		self.keyword(ps, keyword).is_ok()
	}

	/* TRANSLATION UNIT */

	pub(super) fn translation_unit(&mut self, ps: &mut ParseState) -> Res {
		self.emit(ps, REVISION);
		self.extensions(ps)?;
		self.external_declaration(ps)?;
		loop {
			self.extensions(ps)?;
			if self.external_declaration(ps).is_err() {
				break;
			}
		}
		self.emit(ps, EXTERNAL_NULL);
		self.token(ps, Token::Eof)
	}

	/// Consumes any `#extension` tokens, tracking whether fragment coordinate conventions are enabled.
	fn extensions(&mut self, ps: &mut ParseState) -> Res {
		loop {
			let (name, enable) = match self.fetch(ps.input).ok_or(NoMatch)? {
				Token::ExtensionRequire(name)
				| Token::ExtensionEnable(name)
				| Token::ExtensionWarn(name) => (name, true),
				Token::ExtensionDisable(name) => (name, false),
				_ => return Ok(()),
			};
			ps.input += 1;
			if name == self.dict.all || name == self.dict.fragment_coord_conventions
			{
				self.flags
					.set(ParseFlags::FRAGMENT_COORD_CONVENTIONS, enable);
			}
		}
	}

	fn external_declaration(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, 0);

		let kind = if self.precision_stmt(&mut p).is_ok() {
			DEFAULT_PRECISION
		} else if self.function_definition(&mut p).is_ok() {
			EXTERNAL_FUNCTION_DEFINITION
		} else if self.invariant_stmt(&mut p).is_ok() {
			INVARIANT_STMT
		} else if self.declaration(&mut p).is_ok() {
			EXTERNAL_DECLARATION
		} else {
			return self.fail("expected an identifier");
		};
		self.patch(e, kind);
		*ps = p;
		Ok(())
	}

	fn function_definition(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.function_prototype(&mut p)?;
		self.compound_statement_no_new_scope(&mut p)?;
		*ps = p;
		Ok(())
	}

	fn invariant_stmt(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.keyword(&mut p, self.dict.invariant)?;
		self.identifier(&mut p)?;
		self.token(&mut p, Token::Semicolon)?;
		*ps = p;
		Ok(())
	}

	/* DECLARATIONS */

	fn declaration(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, DECLARATION_FUNCTION_PROTOTYPE);
		if self.function_prototype(&mut p).is_err() {
			self.init_declarator_list(&mut p)?;
			self.patch(e, DECLARATION_INIT_DECLARATOR_LIST);
		}
		if self.token(&mut p, Token::Semicolon).is_err() {
			return self.fail("expected `;'");
		}
		*ps = p;
		Ok(())
	}

	fn single_declaration(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.fully_specified_type(&mut p)?;

		let e = self.emit(&mut p, VARIABLE_IDENTIFIER);
		if self.identifier(&mut p).is_err() {
			// A declaration of a type only, e.g. `struct S { int x; };`.
			self.patch(e, VARIABLE_NONE);
			*ps = p;
			return Ok(());
		}

		let e = self.emit(&mut p, VARIABLE_NONE);
		*ps = p;

		if self.token(&mut p, Token::Assign).is_ok() {
			self.patch(e, VARIABLE_INITIALIZER);
			if self.initializer(&mut p).is_ok() {
				*ps = p;
				return Ok(());
			}
			return self.fail("expected an initialiser");
		}

		p = *ps;
		if self.token(&mut p, Token::LBracket).is_ok() {
			let arrayness = self.array_size(&mut p);
			self.patch(e, arrayness);
			if self.token(&mut p, Token::RBracket).is_ok() {
				*ps = p;
				return Ok(());
			}
			return self.fail("expected `]'");
		}
		Ok(())
	}

	/// Parses an optional array size, returning whether the array is explicitly sized.
	fn array_size(&mut self, ps: &mut ParseState) -> u8 {
		if self.constant_expression(ps).is_ok() {
			VARIABLE_ARRAY_EXPLICIT
		} else {
			VARIABLE_ARRAY_UNKNOWN
		}
	}

	fn init_declarator_list(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.single_declaration(&mut p)?;

		loop {
			*ps = p;
			if self.token(&mut p, Token::Comma).is_err() {
				break;
			}
			self.emit(&mut p, DECLARATOR_NEXT);
			self.emit(&mut p, VARIABLE_IDENTIFIER);
			if self.identifier(&mut p).is_err() {
				break;
			}

			let e = self.emit(&mut p, VARIABLE_NONE);
			*ps = p;

			if self.token(&mut p, Token::Assign).is_ok() {
				if self.initializer(&mut p).is_ok() {
					self.patch(e, VARIABLE_INITIALIZER);
					*ps = p;
					continue;
				}
				self.error("expected an initialiser");
				break;
			}
			p = *ps;

			if self.token(&mut p, Token::LBracket).is_ok() {
				let arrayness = self.array_size(&mut p);
				if self.token(&mut p, Token::RBracket).is_ok() {
					self.patch(e, arrayness);
					*ps = p;
					continue;
				}
				self.error("expected `]'");
				break;
			}
			p = *ps;
		}

		self.emit(ps, DECLARATOR_NONE);
		Ok(())
	}

	fn initializer(&mut self, ps: &mut ParseState) -> Res {
		self.assignment_expression(ps)?;
		self.emit(ps, OP_END);
		Ok(())
	}

	/* FUNCTIONS */

	fn function_prototype(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		if self.function_header(&mut p).is_ok()
			&& self.keyword(&mut p, self.dict.void).is_ok()
		{
			if self.token(&mut p, Token::RParen).is_err() {
				return self.fail("expected `)'");
			}
			self.emit(&mut p, PARAMETER_NONE);
			*ps = p;
			return Ok(());
		}

		p = *ps;
		self.function_declarator(&mut p)?;
		if self.token(&mut p, Token::RParen).is_err() {
			return self.fail("expected `)'");
		}
		self.emit(&mut p, PARAMETER_NONE);
		*ps = p;
		Ok(())
	}

	fn function_declarator(&mut self, ps: &mut ParseState) -> Res {
		if self.function_header_with_parameters(ps).is_ok() {
			return Ok(());
		}
		self.function_header(ps)
	}

	fn function_header_with_parameters(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.function_header(&mut p)?;
		self.parameter_declaration(&mut p)?;
		loop {
			*ps = p;
			if self.token(&mut p, Token::Comma).is_err()
				|| self.parameter_declaration(&mut p).is_err()
			{
				return Ok(());
			}
		}
	}

	fn function_header(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.fully_specified_type(&mut p)?;
		self.function_decl_identifier(&mut p)?;
		self.token(&mut p, Token::LParen)?;
		*ps = p;
		Ok(())
	}

	fn function_decl_identifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, 0);

		if self.is_builtin()
			&& self.keyword(&mut p, self.dict.constructor).is_ok()
		{
			self.patch(e, FUNCTION_CONSTRUCTOR);
			*ps = p;
			return Ok(());
		}

		if self.is_builtin() && self.keyword(&mut p, self.dict.operator).is_ok() {
			self.patch(e, FUNCTION_OPERATOR);
			let op =
				self.operator(&mut p, OVERRIDABLE_OPERATORS).ok_or(NoMatch)?;
			self.emit(&mut p, op);
			*ps = p;
			return Ok(());
		}

		self.identifier(&mut p)?;
		self.patch(e, FUNCTION_ORDINARY);
		*ps = p;
		Ok(())
	}

	fn parameter_declaration(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, PARAMETER_NEXT);
		if self.storage_qualifier(&mut p).is_err() {
			self.emit(&mut p, TYPE_QUALIFIER_NONE);
		}
		self.parameter_qualifier(&mut p);
		if self.precision(&mut p).is_err() {
			self.emit(&mut p, PRECISION_DEFAULT);
		}
		if self.parameter_declarator(&mut p).is_err() {
			self.parameter_type_specifier(&mut p)?;
		}
		*ps = p;
		Ok(())
	}

	/// Emits the parameter direction; a missing qualifier means `in`.
	fn parameter_qualifier(&mut self, ps: &mut ParseState) {
		let e = self.emit(ps, PARAM_QUALIFIER_IN);
		if self.keyword(ps, self.dict.out).is_ok() {
			self.patch(e, PARAM_QUALIFIER_OUT);
		} else if self.keyword(ps, self.dict.inout).is_ok() {
			self.patch(e, PARAM_QUALIFIER_INOUT);
		} else {
			self.skip_keyword(ps, self.dict.in_);
		}
	}

	fn parameter_declarator(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.type_specifier(&mut p)?;
		self.identifier(&mut p)?;
		let e = self.emit(&mut p, PARAMETER_ARRAY_PRESENT);
		if self.array_specifier(&mut p).is_err() {
			self.patch(e, PARAMETER_ARRAY_NOT_PRESENT);
		}
		*ps = p;
		Ok(())
	}

	/// A parameter without a name, e.g. `float` in `void f(float);`.
	fn parameter_type_specifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.type_specifier(&mut p)?;
		// The empty name.
		self.emit(&mut p, 0);
		let e = self.emit(&mut p, PARAMETER_ARRAY_PRESENT);
		if self.array_specifier(&mut p).is_err() {
			self.patch(e, PARAMETER_ARRAY_NOT_PRESENT);
		}
		*ps = p;
		Ok(())
	}

	/* TYPES */

	fn fully_specified_type(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.layout_qualifier(&mut p)?;
		self.emit(&mut p, LAYOUT_QUALIFIER_NONE);

		if self.keyword(&mut p, self.dict.invariant).is_ok() {
			self.emit(&mut p, TYPE_INVARIANT);
		} else {
			self.emit(&mut p, TYPE_VARIANT);
		}

		if self.keyword(&mut p, self.dict.centroid).is_ok() {
			self.emit(&mut p, TYPE_CENTROID);
		} else {
			self.emit(&mut p, TYPE_CENTER);
		}

		if self.storage_qualifier(&mut p).is_err() {
			self.emit(&mut p, TYPE_QUALIFIER_NONE);
		}
		if self.precision(&mut p).is_err() {
			self.emit(&mut p, PRECISION_DEFAULT);
		}
		self.type_specifier(&mut p)?;
		*ps = p;
		Ok(())
	}

	/// Parses an optional `layout(...)` qualifier, emitting the id of each listed qualifier.
	///
	/// The list is terminated by the [`LAYOUT_QUALIFIER_NONE`] the caller emits.
	fn layout_qualifier(&mut self, ps: &mut ParseState) -> Res {
		if self.keyword(ps, self.dict.layout).is_err() {
			return Ok(());
		}
		if !self.flags.contains(ParseFlags::FRAGMENT_COORD_CONVENTIONS) {
			return self.fail("GL_ARB_fragment_coord_conventions extension must be enabled in order to use a layout qualifier");
		}
		if self.stage != ShaderStage::Fragment {
			return self.fail("layout qualifiers are only valid for fragment shaders");
		}
		if self.token(ps, Token::LParen).is_err() {
			return self.fail("expected `('");
		}

		loop {
			if self.keyword(ps, self.dict.origin_upper_left).is_ok() {
				self.emit(ps, LAYOUT_QUALIFIER_UPPER_LEFT);
			} else if self.keyword(ps, self.dict.pixel_center_integer).is_ok() {
				self.emit(ps, LAYOUT_QUALIFIER_PIXEL_CENTER_INTEGER);
			} else {
				return self.fail("expected a layout qualifier name");
			}

			if self.token(ps, Token::RParen).is_ok() {
				return Ok(());
			}
			if self.token(ps, Token::Comma).is_err() {
				return self.fail("expected `,' or `)'");
			}
		}
	}

	fn storage_qualifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let id = self.peek_identifier(&p).ok_or(NoMatch)?;
		let d = self.dict;
		let qualifier = if id == d.const_ {
			TYPE_QUALIFIER_CONST
		} else if id == d.attribute && self.stage == ShaderStage::Vertex {
			TYPE_QUALIFIER_ATTRIBUTE
		} else if id == d.varying {
			TYPE_QUALIFIER_VARYING
		} else if id == d.uniform {
			TYPE_QUALIFIER_UNIFORM
		} else if id == d.fixed_output && self.is_builtin() {
			TYPE_QUALIFIER_FIXEDOUTPUT
		} else if id == d.fixed_input && self.is_builtin() {
			TYPE_QUALIFIER_FIXEDINPUT
		} else {
			return Err(NoMatch);
		};
		p.input += 1;
		self.emit(&mut p, qualifier);
		*ps = p;
		Ok(())
	}

	fn precision(&mut self, ps: &mut ParseState) -> Res {
		let id = self.peek_identifier(ps).ok_or(NoMatch)?;
		let precision = if id == self.dict.lowp {
			PRECISION_LOW
		} else if id == self.dict.mediump {
			PRECISION_MEDIUM
		} else if id == self.dict.highp {
			PRECISION_HIGH
		} else {
			return Err(NoMatch);
		};
		ps.input += 1;
		self.emit(ps, precision);
		Ok(())
	}

	fn type_specifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.type_specifier_nonarray(&mut p)?;
		let e = self.emit(&mut p, TYPE_SPECIFIER_ARRAY);
		if self.array_specifier(&mut p).is_err() {
			self.patch(e, TYPE_SPECIFIER_NONARRAY);
		}
		*ps = p;
		Ok(())
	}

	fn type_specifier_nonarray(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, 0);

		if self.struct_specifier(&mut p).is_ok() {
			self.patch(e, TYPE_SPECIFIER_STRUCT);
			*ps = p;
			return Ok(());
		}

		let id = self.peek_identifier(&p).ok_or(NoMatch)?;
		if let Some(code) = self.types.get(&id).copied() {
			p.input += 1;
			self.patch(e, code);
		} else {
			self.identifier(&mut p)?;
			self.patch(e, TYPE_SPECIFIER_TYPENAME);
		}
		*ps = p;
		Ok(())
	}

	/// `[` constant-expression `]`, as used after a type or a parameter name.
	fn array_specifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.token(&mut p, Token::LBracket)?;
		if self.constant_expression(&mut p).is_err() {
			return self.fail("expected constant integral expression");
		}
		if self.token(&mut p, Token::RBracket).is_err() {
			return self.fail("expected `]'");
		}
		*ps = p;
		Ok(())
	}

	fn struct_specifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.keyword(&mut p, self.dict.struct_)?;
		if self.identifier(&mut p).is_err() {
			// Anonymous struct.
			self.emit(&mut p, 0);
		}
		if self.token(&mut p, Token::LBrace).is_err() {
			return self.fail("expected `{'");
		}
		self.struct_declaration_list(&mut p)?;
		self.token(&mut p, Token::RBrace)?;
		self.emit(&mut p, FIELD_NONE);
		*ps = p;
		Ok(())
	}

	fn struct_declaration_list(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.struct_declaration(&mut p)?;
		loop {
			*ps = p;
			self.emit(&mut p, FIELD_NEXT);
			if self.struct_declaration(&mut p).is_err() {
				return Ok(());
			}
		}
	}

	fn struct_declaration(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.type_specifier(&mut p)?;
		self.struct_declarator_list(&mut p)?;
		self.token(&mut p, Token::Semicolon)?;
		self.emit(&mut p, FIELD_NONE);
		*ps = p;
		Ok(())
	}

	fn struct_declarator_list(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.struct_declarator(&mut p)?;
		loop {
			*ps = p;
			self.emit(&mut p, FIELD_NEXT);
			if self.token(&mut p, Token::Comma).is_err()
				|| self.struct_declarator(&mut p).is_err()
			{
				return Ok(());
			}
		}
	}

	/// A field name with an optional array size. The caller's state is advanced past the name even if the array
	/// size then fails to parse.
	fn struct_declarator(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.identifier(&mut p)?;
		let e = self.emit(&mut p, FIELD_NONE);
		*ps = p;

		if self.token(&mut p, Token::LBracket).is_err() {
			return Ok(());
		}
		if self.constant_expression(&mut p).is_err() {
			return self.fail("expected constant integral expression");
		}
		if self.token(&mut p, Token::RBracket).is_err() {
			return self.fail("expected `]'");
		}
		self.patch(e, FIELD_ARRAY);
		*ps = p;
		Ok(())
	}

	/* STATEMENTS */

	fn compound_statement_no_new_scope(&mut self, ps: &mut ParseState) -> Res {
		self.block(ps, OP_BLOCK_BEGIN_NO_NEW_SCOPE)
	}

	fn compound_statement(&mut self, ps: &mut ParseState) -> Res {
		self.block(ps, OP_BLOCK_BEGIN_NEW_SCOPE)
	}

	fn block(&mut self, ps: &mut ParseState, begin: u8) -> Res {
		let mut p = *ps;
		self.token(&mut p, Token::LBrace)?;
		self.emit(&mut p, begin);
		self.statements(&mut p);
		self.token(&mut p, Token::RBrace)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	/// Zero or more statements; stops at the first token which doesn't start one.
	fn statements(&mut self, ps: &mut ParseState) {
		let mut p = *ps;
		while self.statement(&mut p).is_ok() {
			*ps = p;
		}
	}

	fn statement(&mut self, ps: &mut ParseState) -> Res {
		if self.compound_statement(ps).is_ok() {
			return Ok(());
		}
		self.simple_statement(ps)
	}

	fn simple_statement(&mut self, ps: &mut ParseState) -> Res {
		if self.selection_statement(ps).is_ok()
			|| self.iteration_statement(ps).is_ok()
			|| self.jump_statement(ps).is_ok()
		{
			return Ok(());
		}

		let mut p = *ps;
		let e = self.emit(&mut p, OP_EXPRESSION);
		if self.expression_statement(&mut p).is_ok() {
			*ps = p;
			return Ok(());
		}

		let kind = if self.precision_stmt(&mut p).is_ok() {
			OP_PRECISION
		} else if self.is_builtin() && self.asm_statement(&mut p).is_ok() {
			OP_ASM
		} else if self.declaration(&mut p).is_ok() {
			OP_DECLARE
		} else {
			return Err(NoMatch);
		};
		self.patch(e, kind);
		*ps = p;
		Ok(())
	}

	fn selection_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_IF);
		self.keyword(&mut p, self.dict.if_)?;
		if self.token(&mut p, Token::LParen).is_err() {
			return self.fail("expected `('");
		}
		if self.expression(&mut p).is_err() {
			return self.fail("expected an expression");
		}
		if self.token(&mut p, Token::RParen).is_err() {
			return self.fail("expected `)'");
		}
		self.emit(&mut p, OP_END);
		self.statement(&mut p)?;

		*ps = p;
		if self.keyword(&mut p, self.dict.else_).is_ok()
			&& self.statement(&mut p).is_ok()
		{
			*ps = p;
			return Ok(());
		}

		// Without an `else`, the false branch is an empty expression statement.
		self.emit(ps, OP_EXPRESSION);
		self.emit(ps, OP_PUSH_VOID);
		self.emit(ps, OP_END);
		Ok(())
	}

	fn iteration_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;

		if self.keyword(&mut p, self.dict.while_).is_ok() {
			self.emit(&mut p, OP_WHILE);
			if self.token(&mut p, Token::LParen).is_err() {
				return self.fail("expected `('");
			}
			if self.condition(&mut p).is_err() {
				return self.fail("expected an expression");
			}
			if self.token(&mut p, Token::RParen).is_err() {
				return self.fail("expected `)'");
			}
			self.statement(&mut p)?;
		} else if self.keyword(&mut p, self.dict.do_).is_ok() {
			self.emit(&mut p, OP_DO);
			self.statement(&mut p)?;
			self.keyword(&mut p, self.dict.while_)?;
			if self.token(&mut p, Token::LParen).is_err() {
				return self.fail("expected `('");
			}
			if self.expression(&mut p).is_err() {
				return self.fail("expected an expression");
			}
			if self.token(&mut p, Token::RParen).is_err() {
				return self.fail("expected `)'");
			}
			self.emit(&mut p, OP_END);
			if self.token(&mut p, Token::Semicolon).is_err() {
				return self.fail("expected `;'");
			}
		} else if self.keyword(&mut p, self.dict.for_).is_ok() {
			self.emit(&mut p, OP_FOR);
			if self.token(&mut p, Token::LParen).is_err() {
				return self.fail("expected `('");
			}
			self.for_init_statement(&mut p)?;
			self.for_rest_statement(&mut p)?;
			if self.token(&mut p, Token::RParen).is_err() {
				return self.fail("expected `)'");
			}
			self.statement(&mut p)?;
		} else {
			return Err(NoMatch);
		}

		*ps = p;
		Ok(())
	}

	fn for_init_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, OP_EXPRESSION);
		if self.expression_statement(&mut p).is_err() {
			self.declaration(&mut p)?;
			self.patch(e, OP_DECLARE);
		}
		*ps = p;
		Ok(())
	}

	/// The condition and the increment of a `for` loop. A missing condition is always true; a missing increment is
	/// empty.
	fn for_rest_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		if self.condition(&mut p).is_err() {
			self.emit(&mut p, OP_EXPRESSION);
			self.push_bool(&mut p, true);
			self.emit(&mut p, OP_END);
		}
		self.token(&mut p, Token::Semicolon)?;
		if self.expression(&mut p).is_err() {
			self.emit(&mut p, OP_PUSH_VOID);
		}
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	fn condition(&mut self, ps: &mut ParseState) -> Res {
		if self.condition_initializer(ps).is_ok() {
			return Ok(());
		}

		let mut p = *ps;
		self.emit(&mut p, OP_EXPRESSION);
		self.expression(&mut p)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	/// A declaration used as a condition, e.g. `while (bool b = f())`.
	fn condition_initializer(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_DECLARE);
		self.emit(&mut p, DECLARATION_INIT_DECLARATOR_LIST);
		self.fully_specified_type(&mut p)?;
		self.emit(&mut p, VARIABLE_IDENTIFIER);
		self.identifier(&mut p)?;
		if self.token(&mut p, Token::Assign).is_err() {
			return self.fail("expected `='");
		}
		self.emit(&mut p, VARIABLE_INITIALIZER);
		if self.initializer(&mut p).is_err() {
			return self.fail("expected an initialiser");
		}
		self.emit(&mut p, DECLARATOR_NONE);
		*ps = p;
		Ok(())
	}

	fn jump_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		let e = self.emit(&mut p, 0);

		let d = self.dict;
		let kind = if self.keyword(&mut p, d.continue_).is_ok() {
			OP_CONTINUE
		} else if self.keyword(&mut p, d.break_).is_ok() {
			OP_BREAK
		} else if self.keyword(&mut p, d.return_).is_ok() {
			if self.expression(&mut p).is_err() {
				self.emit(&mut p, OP_PUSH_VOID);
			}
			self.emit(&mut p, OP_END);
			OP_RETURN
		} else if self.stage == ShaderStage::Fragment
			&& self.keyword(&mut p, d.discard).is_ok()
		{
			OP_DISCARD
		} else {
			return Err(NoMatch);
		};

		self.token(&mut p, Token::Semicolon)?;
		self.patch(e, kind);
		*ps = p;
		Ok(())
	}

	fn expression_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		if self.expression(&mut p).is_err() {
			self.emit(&mut p, OP_PUSH_VOID);
		}
		self.token(&mut p, Token::Semicolon)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	fn precision_stmt(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.keyword(&mut p, self.dict.precision)?;
		self.precision(&mut p)?;
		self.precision_type(&mut p)?;
		self.token(&mut p, Token::Semicolon)?;
		*ps = p;
		Ok(())
	}

	fn precision_type(&mut self, ps: &mut ParseState) -> Res {
		let id = self.peek_identifier(ps).ok_or(NoMatch)?;
		let code = self.precision_types.get(&id).copied().ok_or(NoMatch)?;
		ps.input += 1;
		self.emit(ps, code);
		Ok(())
	}

	/// `__asm name args;`, only available to the built-in library.
	fn asm_statement(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.keyword(&mut p, self.dict.asm)?;
		self.identifier(&mut p)?;
		self.asm_arguments(&mut p)?;
		self.token(&mut p, Token::Semicolon)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	fn asm_arguments(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.asm_argument(&mut p)?;
		self.emit(&mut p, OP_END);
		loop {
			*ps = p;
			if self.token(&mut p, Token::Comma).is_err()
				|| self.asm_argument(&mut p).is_err()
			{
				return Ok(());
			}
			self.emit(&mut p, OP_END);
		}
	}

	fn asm_argument(&mut self, ps: &mut ParseState) -> Res {
		if self.variable_identifier(ps).is_ok() {
			let mut p = *ps;
			if self.token(&mut p, Token::Dot).is_ok() {
				self.emit(&mut p, OP_FIELD);
				if self.identifier(&mut p).is_ok() {
					*ps = p;
				}
			}
			return Ok(());
		}
		self.float_constant(ps)
	}

	/* EXPRESSIONS */

	fn expression(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.assignment_expression(&mut p)?;
		loop {
			*ps = p;
			if self.token(&mut p, Token::Comma).is_err()
				|| self.assignment_expression(&mut p).is_err()
			{
				return Ok(());
			}
			self.emit(&mut p, OP_SEQUENCE);
		}
	}

	/// Either an assignment (unary, operator, assignment expression) or a conditional expression.
	///
	/// Both alternatives start with a unary expression, which is parsed once and shared; reparsing it for the
	/// second alternative would double the work at every level of parenthesis nesting.
	fn assignment_expression(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.unary_expression(&mut p)?;

		let mut q = p;
		if let Some(op) = self.operator(&mut q, ASSIGNMENT_OPERATORS) {
			if self.assignment_expression(&mut q).is_ok() {
				self.emit(&mut q, op);
				*ps = q;
				return Ok(());
			}
		}

		// The unary expression is the leftmost operand of a conditional expression; resume every binary level
		// above it.
		for (operand, operators) in Self::binary_levels() {
			self.binary_tail(&mut p, operand, operators);
		}
		self.conditional_tail(&mut p);
		*ps = p;
		Ok(())
	}

	fn constant_expression(&mut self, ps: &mut ParseState) -> Res {
		self.conditional_expression(ps)?;
		self.emit(ps, OP_END);
		Ok(())
	}

	fn conditional_expression(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.logical_or_expression(&mut p)?;
		self.conditional_tail(&mut p);
		*ps = p;
		Ok(())
	}

	/// Any number of `? expression : conditional_expression` following a parsed condition.
	fn conditional_tail(&mut self, ps: &mut ParseState) {
		let mut p = *ps;
		loop {
			*ps = p;
			if self.token(&mut p, Token::Question).is_err()
				|| self.expression(&mut p).is_err()
				|| self.token(&mut p, Token::Colon).is_err()
				|| self.conditional_expression(&mut p).is_err()
			{
				return;
			}
			self.emit(&mut p, OP_SELECT);
		}
	}

	/// The binary precedence levels from tightest to loosest: each level's operand and its operators.
	fn binary_levels() -> [(Production<Self>, &'static [(Token, u8)]); 7] {
		[
			(Self::unary_expression, MULTIPLICATIVE),
			(Self::multiplicative_expression, ADDITIVE),
			(Self::additive_expression, RELATIONAL),
			(Self::relational_expression, EQUALITY),
			(Self::equality_expression, LOGICAL_AND),
			(Self::logical_and_expression, LOGICAL_XOR),
			(Self::logical_xor_expression, LOGICAL_OR),
		]
	}

	/// A left-associative chain of `operand`s joined by any of `operators`. The opcode of each operator is emitted
	/// after its right operand.
	fn binary(
		&mut self,
		ps: &mut ParseState,
		operand: Production<Self>,
		operators: &[(Token, u8)],
	) -> Res {
		let mut p = *ps;
		operand(self, &mut p)?;
		self.binary_tail(&mut p, operand, operators);
		*ps = p;
		Ok(())
	}

	/// The rest of a [`binary()`](Self::binary) chain once its first operand has been parsed. An operator without
	/// a right operand is left unconsumed.
	fn binary_tail(
		&mut self,
		ps: &mut ParseState,
		operand: Production<Self>,
		operators: &[(Token, u8)],
	) {
		let mut p = *ps;
		loop {
			*ps = p;
			let op = match self.operator(&mut p, operators) {
				Some(op) => op,
				None => return,
			};
			if operand(self, &mut p).is_err() {
				return;
			}
			self.emit(&mut p, op);
		}
	}

	fn logical_or_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::logical_xor_expression, LOGICAL_OR)
	}

	fn logical_xor_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::logical_and_expression, LOGICAL_XOR)
	}

	fn logical_and_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::equality_expression, LOGICAL_AND)
	}

	fn equality_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::relational_expression, EQUALITY)
	}

	fn relational_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::additive_expression, RELATIONAL)
	}

	fn additive_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::multiplicative_expression, ADDITIVE)
	}

	fn multiplicative_expression(&mut self, ps: &mut ParseState) -> Res {
		self.binary(ps, Self::unary_expression, MULTIPLICATIVE)
	}

	fn unary_expression(&mut self, ps: &mut ParseState) -> Res {
		if self.postfix_expression(ps).is_ok() {
			return Ok(());
		}

		let mut p = *ps;
		let op = self.operator(&mut p, PREFIX_OPERATORS).ok_or(NoMatch)?;
		self.unary_expression(&mut p)?;
		self.emit(&mut p, op);
		*ps = p;
		Ok(())
	}

	fn postfix_expression(&mut self, ps: &mut ParseState) -> Res {
		if self.function_call(ps).is_err() {
			self.primary_expression(ps)?;
		}

		let mut p = *ps;
		loop {
			*ps = p;
			if self.token(&mut p, Token::Increment).is_ok() {
				self.emit(&mut p, OP_POSTINCREMENT);
			} else if self.token(&mut p, Token::Decrement).is_ok() {
				self.emit(&mut p, OP_POSTDECREMENT);
			} else if self.token(&mut p, Token::LBracket).is_ok() {
				if self.expression(&mut p).is_err() {
					return self.fail("expected an integral expression");
				}
				if self.token(&mut p, Token::RBracket).is_err() {
					return self.fail("expected `]'");
				}
				self.emit(&mut p, OP_SUBSCRIPT);
			} else if self.token(&mut p, Token::Dot).is_ok() {
				self.emit(&mut p, OP_FIELD);
				if self.identifier(&mut p).is_err() {
					return Ok(());
				}
			} else {
				return Ok(());
			}
		}
	}

	fn primary_expression(&mut self, ps: &mut ParseState) -> Res {
		if self.float_constant(ps).is_ok()
			|| self.bool_constant(ps).is_ok()
			|| self.int_constant(ps).is_ok()
			|| self.variable_identifier(ps).is_ok()
		{
			return Ok(());
		}

		let mut p = *ps;
		self.token(&mut p, Token::LParen)?;
		self.expression(&mut p)?;
		self.token(&mut p, Token::RParen)?;
		*ps = p;
		Ok(())
	}

	fn variable_identifier(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_PUSH_IDENTIFIER);
		self.identifier(&mut p)?;
		*ps = p;
		Ok(())
	}

	fn float_constant(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_PUSH_FLOAT);
		self.float(&mut p)?;
		*ps = p;
		Ok(())
	}

	fn int_constant(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_PUSH_INT);
		self.uint(&mut p)?;
		*ps = p;
		Ok(())
	}

	fn bool_constant(&mut self, ps: &mut ParseState) -> Res {
		let value = if self.keyword(ps, self.dict.false_).is_ok() {
			false
		} else if self.keyword(ps, self.dict.true_).is_ok() {
			true
		} else {
			return Err(NoMatch);
		};
		self.push_bool(ps, value);
		Ok(())
	}

	fn push_bool(&mut self, ps: &mut ParseState, value: bool) {
		self.emit(ps, OP_PUSH_BOOL);
		self.emit(ps, LITERAL_BOOL);
		self.emit(ps, if value { b'1' } else { b'0' });
		self.emit(ps, 0);
	}

	/* FUNCTION CALLS */

	fn function_call(&mut self, ps: &mut ParseState) -> Res {
		if self.regular_function_call(ps).is_ok() {
			return Ok(());
		}
		self.method_call(ps)
	}

	fn regular_function_call(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_CALL);
		self.function_call_generic(&mut p)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	/// `object.method(args)`, e.g. `a.length()`.
	fn method_call(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.emit(&mut p, OP_METHOD);
		self.identifier(&mut p)?;
		self.token(&mut p, Token::Dot)?;
		self.function_call_generic(&mut p)?;
		self.emit(&mut p, OP_END);
		*ps = p;
		Ok(())
	}

	fn function_call_generic(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		if self.function_call_header_with_parameters(&mut p).is_ok() {
			if self.token(&mut p, Token::RParen).is_ok() {
				*ps = p;
				return Ok(());
			}
			return self.fail("expected `)'");
		}

		p = *ps;
		if self.function_call_header_no_parameters(&mut p).is_ok() {
			if self.token(&mut p, Token::RParen).is_ok() {
				*ps = p;
				return Ok(());
			}
			return self.fail("expected `)'");
		}
		Err(NoMatch)
	}

	fn function_call_header_with_parameters(
		&mut self,
		ps: &mut ParseState,
	) -> Res {
		let mut p = *ps;
		self.function_call_header(&mut p)?;
		self.assignment_expression(&mut p)?;
		self.emit(&mut p, OP_END);
		loop {
			*ps = p;
			if self.token(&mut p, Token::Comma).is_err()
				|| self.assignment_expression(&mut p).is_err()
			{
				return Ok(());
			}
			self.emit(&mut p, OP_END);
		}
	}

	fn function_call_header_no_parameters(&mut self, ps: &mut ParseState) -> Res {
		self.function_call_header(ps)?;
		self.skip_keyword(ps, self.dict.void);
		Ok(())
	}

	fn function_call_header(&mut self, ps: &mut ParseState) -> Res {
		let mut p = *ps;
		self.function_identifier(&mut p)?;
		self.token(&mut p, Token::LParen)?;
		*ps = p;
		Ok(())
	}

	/// The callee: a name, optionally followed by an array size for array constructors such as `float[3](...)`.
	fn function_identifier(&mut self, ps: &mut ParseState) -> Res {
		self.identifier(ps)?;
		let e = self.emit(ps, FUNCTION_CALL_NONARRAY);

		let mut p = *ps;
		if self.token(&mut p, Token::LBracket).is_err() {
			return Ok(());
		}
		if self.constant_expression(&mut p).is_err() {
			return self.fail("expected constant integral expression");
		}
		if self.token(&mut p, Token::RBracket).is_err() {
			return self.fail("expected `]'");
		}
		self.patch(e, FUNCTION_CALL_ARRAY);
		*ps = p;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::super::opcodes::*;
	use crate::{Context, ShaderStage};

	fn compile(src: &str, stage: ShaderStage, builtin: bool) -> Result<Vec<u8>, String> {
		let mut ctx = Context::new();
		ctx.compile(src, stage, builtin).map_err(|e| e.to_string())
	}

	/// Asserts the opcode stream of a fragment shader, or the error message it fails with.
	macro_rules! assert_opcodes {
		($src:expr, [$($byte:expr),* $(,)?]) => {
			assert_eq!(
				compile($src, ShaderStage::Fragment, false),
				Ok(vec![$($byte as u8),*]),
				"{:?}",
				$src
			);
		};
		($src:expr, err: $msg:expr) => {
			assert_eq!(
				compile($src, ShaderStage::Fragment, false),
				Err($msg.to_owned()),
				"{:?}",
				$src
			);
		};
	}

	/// The bytes of a string operand.
	fn text(s: &str) -> Vec<u8> {
		let mut v = s.as_bytes().to_vec();
		v.push(0);
		v
	}

	/// Prefix of a function definition returning void with an ordinary name.
	fn void_function(name: &str) -> Vec<u8> {
		let mut v = vec![
			EXTERNAL_FUNCTION_DEFINITION,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_NONE,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_VOID,
			TYPE_SPECIFIER_NONARRAY,
			FUNCTION_ORDINARY,
		];
		v.extend(text(name));
		v
	}

	/// The opcodes of `void main() { BODY }` where BODY produced `body`.
	fn main_with_body(body: &[u8]) -> Vec<u8> {
		let mut v = vec![REVISION];
		v.extend(void_function("main"));
		v.push(PARAMETER_NONE);
		v.push(OP_BLOCK_BEGIN_NO_NEW_SCOPE);
		v.extend_from_slice(body);
		v.push(OP_END);
		v.push(EXTERNAL_NULL);
		v
	}

	#[test]
	fn empty_main() {
		assert_opcodes!(
			"void main() { }",
			[5, 1, 0, 90, 95, 0, 0, 0, 0, 0, b'm', b'a', b'i', b'n', 0, 0, 1, 0, 0]
		);
		assert_eq!(
			compile("void main(void) { }", ShaderStage::Fragment, false),
			Ok(main_with_body(&[]))
		);
	}

	#[test]
	fn empty_input() {
		assert_opcodes!("", err: "expected an identifier");
		assert_opcodes!("\n\n", err: "expected an identifier");
	}

	#[test]
	fn global_declarations() {
		let mut expected = vec![
			REVISION,
			EXTERNAL_DECLARATION,
			DECLARATION_INIT_DECLARATOR_LIST,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_UNIFORM,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_VEC4,
			TYPE_SPECIFIER_NONARRAY,
			VARIABLE_IDENTIFIER,
		];
		expected.extend(text("color"));
		expected.push(VARIABLE_NONE);
		expected.push(DECLARATOR_NEXT);
		expected.push(VARIABLE_IDENTIFIER);
		expected.extend(text("tint"));
		expected.push(VARIABLE_NONE);
		expected.push(DECLARATOR_NONE);
		expected.push(EXTERNAL_NULL);
		assert_eq!(
			compile("uniform vec4 color, tint;", ShaderStage::Fragment, false),
			Ok(expected)
		);
	}

	#[test]
	fn initializer() {
		let mut expected = vec![
			REVISION,
			EXTERNAL_DECLARATION,
			DECLARATION_INIT_DECLARATOR_LIST,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_CONST,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_INT,
			TYPE_SPECIFIER_NONARRAY,
			VARIABLE_IDENTIFIER,
		];
		expected.extend(text("x"));
		expected.push(VARIABLE_INITIALIZER);
		expected.push(OP_PUSH_INT);
		expected.push(LITERAL_NUMBER);
		expected.extend(text("1"));
		expected.push(OP_PUSH_INT);
		expected.push(LITERAL_NUMBER);
		expected.extend(text("2"));
		expected.push(OP_PUSH_INT);
		expected.push(LITERAL_NUMBER);
		expected.extend(text("3"));
		expected.push(OP_MULTIPLY);
		expected.push(OP_ADD);
		expected.push(OP_END);
		expected.push(DECLARATOR_NONE);
		expected.push(EXTERNAL_NULL);
		assert_eq!(
			compile("const int x = 1 + 2 * 3;", ShaderStage::Fragment, false),
			Ok(expected)
		);
	}

	#[test]
	fn arrays() {
		let mut expected = vec![
			REVISION,
			EXTERNAL_DECLARATION,
			DECLARATION_INIT_DECLARATOR_LIST,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_NONE,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_FLOAT,
			TYPE_SPECIFIER_NONARRAY,
			VARIABLE_IDENTIFIER,
		];
		expected.extend(text("a"));
		expected.push(VARIABLE_ARRAY_EXPLICIT);
		expected.push(OP_PUSH_INT);
		expected.push(LITERAL_NUMBER);
		expected.extend(text("4"));
		expected.push(OP_END);
		expected.push(DECLARATOR_NEXT);
		expected.push(VARIABLE_IDENTIFIER);
		expected.extend(text("b"));
		expected.push(VARIABLE_ARRAY_UNKNOWN);
		expected.push(DECLARATOR_NONE);
		expected.push(EXTERNAL_NULL);
		assert_eq!(
			compile("float a[4], b[];", ShaderStage::Fragment, false),
			Ok(expected)
		);
	}

	#[test]
	fn statements() {
		let mut body = vec![OP_DECLARE, DECLARATION_INIT_DECLARATOR_LIST];
		body.extend([
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_NONE,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_INT,
			TYPE_SPECIFIER_NONARRAY,
			VARIABLE_IDENTIFIER,
		]);
		body.extend(text("i"));
		body.push(VARIABLE_NONE);
		body.push(DECLARATOR_NONE);
		// i++;
		body.push(OP_EXPRESSION);
		body.push(OP_PUSH_IDENTIFIER);
		body.extend(text("i"));
		body.push(OP_POSTINCREMENT);
		body.push(OP_END);
		// return;
		body.push(OP_RETURN);
		body.push(OP_PUSH_VOID);
		body.push(OP_END);
		assert_eq!(
			compile("void main() { int i; i++; return; }", ShaderStage::Fragment, false),
			Ok(main_with_body(&body))
		);
	}

	#[test]
	fn if_without_else() {
		let mut body = vec![OP_IF, OP_PUSH_BOOL, LITERAL_BOOL, b'1', 0, OP_END];
		body.push(OP_BREAK);
		body.extend([OP_EXPRESSION, OP_PUSH_VOID, OP_END]);
		assert_eq!(
			compile("void main() { if (true) break; }", ShaderStage::Fragment, false),
			Ok(main_with_body(&body))
		);
	}

	#[test]
	fn for_loop_defaults() {
		// for (;;) continue;
		let body = vec![
			OP_FOR,
			OP_EXPRESSION,
			OP_PUSH_VOID,
			OP_END,
			OP_EXPRESSION,
			OP_PUSH_BOOL,
			LITERAL_BOOL,
			b'1',
			0,
			OP_END,
			OP_PUSH_VOID,
			OP_END,
			OP_CONTINUE,
		];
		assert_eq!(
			compile("void main() { for (;;) continue; }", ShaderStage::Fragment, false),
			Ok(main_with_body(&body))
		);
	}

	#[test]
	fn function_calls() {
		let mut body = vec![OP_EXPRESSION, OP_PUSH_IDENTIFIER];
		body.extend(text("gl_FragColor"));
		body.push(OP_CALL);
		body.extend(text("vec4"));
		body.push(FUNCTION_CALL_NONARRAY);
		body.push(OP_PUSH_FLOAT);
		body.push(LITERAL_NUMBER);
		body.extend(text("1.0"));
		body.push(OP_END);
		body.push(OP_END);
		body.push(OP_ASSIGN);
		body.push(OP_END);
		assert_eq!(
			compile(
				"void main() { gl_FragColor = vec4(1.0); }",
				ShaderStage::Fragment,
				false
			),
			Ok(main_with_body(&body))
		);
	}

	#[test]
	fn optional_keywords() {
		let mut body = vec![OP_EXPRESSION, OP_CALL];
		body.extend(text("f"));
		body.extend([FUNCTION_CALL_NONARRAY, OP_END, OP_END]);
		assert_eq!(
			compile("void main() { f(); }", ShaderStage::Fragment, false),
			Ok(main_with_body(&body))
		);

		assert_eq!(
			compile("void f(in float a) { }", ShaderStage::Vertex, false),
			compile("void f(float a) { }", ShaderStage::Vertex, false)
		);
		assert!(compile("void f(float a) { }", ShaderStage::Vertex, false).is_ok());

		// Blocks may be empty at any depth.
		let body = [OP_BLOCK_BEGIN_NEW_SCOPE, OP_BLOCK_BEGIN_NEW_SCOPE, OP_END, OP_END];
		assert_eq!(
			compile("void main() { { { } } }", ShaderStage::Fragment, false),
			Ok(main_with_body(&body))
		);
	}

	#[test]
	fn precision_statement() {
		assert_eq!(
			compile("precision mediump float;", ShaderStage::Fragment, false),
			Ok(vec![
				REVISION,
				DEFAULT_PRECISION,
				PRECISION_MEDIUM,
				TYPE_SPECIFIER_FLOAT,
				EXTERNAL_NULL
			])
		);
		assert!(compile("precision mediump vec2;", ShaderStage::Fragment, false).is_err());
	}

	#[test]
	fn stage_restrictions() {
		assert_eq!(
			compile("void main() { discard; }", ShaderStage::Fragment, false),
			Ok(main_with_body(&[OP_DISCARD]))
		);
		// Outside fragment shaders `discard` is an ordinary identifier.
		let mut body = vec![OP_EXPRESSION, OP_PUSH_IDENTIFIER];
		body.extend(text("discard"));
		body.push(OP_END);
		assert_eq!(
			compile("void main() { discard; }", ShaderStage::Vertex, false),
			Ok(main_with_body(&body))
		);
		assert!(compile("attribute vec4 pos;", ShaderStage::Vertex, false).is_ok());
		assert!(compile("attribute vec4 pos;", ShaderStage::Fragment, false).is_err());
	}

	#[test]
	fn layout_qualifiers() {
		assert_opcodes!(
			"layout(origin_upper_left) in vec4 gl_FragCoord;",
			err: "GL_ARB_fragment_coord_conventions extension must be enabled in order to use a layout qualifier"
		);

		let src = "#extension GL_ARB_fragment_coord_conventions : enable\n\
			layout(origin_upper_left, pixel_center_integer) varying vec4 v;";
		let mut ctx = Context::new();
		ctx.add_extension("GL_ARB_fragment_coord_conventions").unwrap();
		let opcodes = ctx.compile(src, ShaderStage::Fragment, false).unwrap();
		assert_eq!(
			&opcodes[..6],
			&[
				REVISION,
				EXTERNAL_DECLARATION,
				DECLARATION_INIT_DECLARATOR_LIST,
				LAYOUT_QUALIFIER_UPPER_LEFT,
				LAYOUT_QUALIFIER_PIXEL_CENTER_INTEGER,
				LAYOUT_QUALIFIER_NONE,
			]
		);

		let mut ctx = Context::new();
		ctx.add_extension("GL_ARB_fragment_coord_conventions").unwrap();
		assert_eq!(
			ctx.compile(src, ShaderStage::Vertex, false)
				.map_err(|e| e.to_string()),
			Err("layout qualifiers are only valid for fragment shaders".to_owned())
		);
	}

	#[test]
	fn builtin_syntax() {
		assert_opcodes!("__asm foo x;", err: "expected `;'");

		let mut expected = vec![
			REVISION,
			EXTERNAL_FUNCTION_DEFINITION,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_NONE,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_INT,
			TYPE_SPECIFIER_NONARRAY,
			FUNCTION_CONSTRUCTOR,
			PARAMETER_NONE,
			OP_BLOCK_BEGIN_NO_NEW_SCOPE,
			OP_ASM,
		];
		expected.extend(text("int_zero"));
		expected.push(OP_PUSH_IDENTIFIER);
		expected.extend(text("__retVal"));
		expected.push(OP_END);
		expected.push(OP_END);
		expected.push(OP_END);
		expected.push(EXTERNAL_NULL);
		assert_eq!(
			compile(
				"int __constructor() { __asm int_zero __retVal; }",
				ShaderStage::Fragment,
				true
			),
			Ok(expected)
		);
	}

	#[test]
	fn overloaded_operator() {
		let opcodes = compile(
			"vec2 __operator + (const vec2 a, const vec2 b) { }",
			ShaderStage::Vertex,
			true,
		)
		.unwrap();
		assert_eq!(opcodes[9], FUNCTION_OPERATOR);
		assert_eq!(opcodes[10], OPERATOR_PLUS);
		assert_eq!(opcodes[11], PARAMETER_NEXT);

		assert!(compile(
			"vec2 __operator + (vec2 a) { }",
			ShaderStage::Vertex,
			false
		)
		.is_err());
	}

	#[test]
	fn structs() {
		let mut expected = vec![
			REVISION,
			EXTERNAL_DECLARATION,
			DECLARATION_INIT_DECLARATOR_LIST,
			LAYOUT_QUALIFIER_NONE,
			TYPE_VARIANT,
			TYPE_CENTER,
			TYPE_QUALIFIER_NONE,
			PRECISION_DEFAULT,
			TYPE_SPECIFIER_STRUCT,
		];
		expected.extend(text("S"));
		expected.push(TYPE_SPECIFIER_FLOAT);
		expected.push(TYPE_SPECIFIER_NONARRAY);
		expected.extend(text("a"));
		expected.push(FIELD_NONE);
		expected.push(FIELD_NEXT);
		expected.extend(text("b"));
		expected.push(FIELD_ARRAY);
		expected.push(OP_PUSH_INT);
		expected.push(LITERAL_NUMBER);
		expected.extend(text("2"));
		expected.push(OP_END);
		expected.push(FIELD_NONE);
		expected.push(FIELD_NONE);
		expected.push(TYPE_SPECIFIER_NONARRAY);
		expected.push(VARIABLE_NONE);
		expected.push(DECLARATOR_NONE);
		expected.push(EXTERNAL_NULL);
		assert_eq!(
			compile("struct S { float a, b[2]; };", ShaderStage::Fragment, false),
			Ok(expected)
		);
	}

	/// The opcodes of an expression statement made of identifiers and operators, e.g. `["a", "b"], [OP_ASSIGN]`.
	fn identifiers_then(names: &[&str], ops: &[u8]) -> Vec<u8> {
		let mut body = vec![OP_EXPRESSION];
		for name in names {
			body.push(OP_PUSH_IDENTIFIER);
			body.extend(text(name));
		}
		body.extend_from_slice(ops);
		body.push(OP_END);
		main_with_body(&body)
	}

	#[test]
	fn assignment_or_conditional() {
		let cases: [(&str, &[&str], &[u8]); 5] = [
			("a = b ? c : d;", &["a", "b", "c", "d"], &[OP_SELECT, OP_ASSIGN]),
			("a = b = c;", &["a", "b", "c"], &[OP_ASSIGN, OP_ASSIGN]),
			("a += b * c;", &["a", "b", "c"], &[OP_MULTIPLY, OP_ADDASSIGN]),
			("a + b * c;", &["a", "b", "c"], &[OP_MULTIPLY, OP_ADD]),
			("a = b || c;", &["a", "b", "c"], &[OP_LOGICALOR, OP_ASSIGN]),
		];
		for (stmt, names, ops) in cases {
			let src = format!("void main() {{ {stmt} }}");
			assert_eq!(
				compile(&src, ShaderStage::Fragment, false),
				Ok(identifiers_then(names, ops)),
				"{stmt}"
			);
		}
		// `a + b` is not an lvalue expression, so the `=` is left over.
		assert!(compile("void main() { a + b = c; }", ShaderStage::Fragment, false).is_err());
	}

	#[test]
	fn deep_parentheses() {
		// Parentheses emit nothing, so any depth must produce the flat stream. Each level is parsed once; a parser
		// which reparsed every level would not finish at this depth.
		let depth = 40;
		let nested = |inner: &str| {
			format!("{}{inner}{}", "(".repeat(depth), ")".repeat(depth))
		};
		let sources = [
			("float x = {};", "1.0"),
			("void main() {{ a = {}; }}", "b = c"),
			("void main() {{ f({}, 2); }}", "a * -b"),
			("void main() {{ a = {}; }}", "b ? c : d"),
		];
		for (template, inner) in sources {
			let flat = template.replace("{}", inner).replace("{{", "{").replace("}}", "}");
			let deep = template
				.replace("{}", &nested(inner))
				.replace("{{", "{")
				.replace("}}", "}");
			let expected = compile(&flat, ShaderStage::Fragment, false);
			assert!(expected.is_ok(), "{flat}");
			assert_eq!(compile(&deep, ShaderStage::Fragment, false), expected, "{template}");
		}
	}

	#[test]
	fn invalid_literals() {
		assert_opcodes!("float x = 1e;", err: "invalid floating-point constant");
		assert_opcodes!("int x = 09;", err: "invalid integer constant");
	}

	#[test]
	fn stray_characters() {
		assert!(compile("void main() { @ }", ShaderStage::Fragment, false).is_err());
	}

	#[test]
	fn preprocessor_error_wins() {
		assert_opcodes!("void main() { }\n#error stop here", err: "stop here");
	}
}
