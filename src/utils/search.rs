use crate::models::Course;

// Each field must appear (case-insensitively) in the matching course field.
// Fields are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    dept_code: String,
    instructor: String,
    description: String,
    course_number: String,
}

impl CourseFilter {
    pub fn new(dept_code: &str, instructor: &str, description: &str, course_number: &str) -> Self {
        Self {
            dept_code: dept_code.to_lowercase(),
            instructor: instructor.to_lowercase(),
            description: description.to_lowercase(),
            course_number: course_number.to_lowercase(),
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        course.dept_code.to_lowercase().contains(&self.dept_code)
            && course.instructor.to_lowercase().contains(&self.instructor)
            && course.description.to_lowercase().contains(&self.description)
            && course.course_number.to_lowercase().contains(&self.course_number)
    }
}

pub fn filter_courses<'a>(courses: &'a [Course], filter: &CourseFilter) -> Vec<&'a Course> {
    courses.iter().filter(|c| filter.matches(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<Course> {
        let course = |id: u32, number: &str, instructor: &str, description: &str| Course {
            id,
            dept_code: "CS".to_string(),
            course_number: number.to_string(),
            instructor: instructor.to_string(),
            description: description.to_string(),
            location: "Hall A".to_string(),
            meeting_time: "MWF 09:00-09:50".to_string(),
        };
        vec![
            course(1, "101", "Grace Hopper", "Intro to Programming"),
            course(2, "310", "Alan Turing", "Theory of Computation"),
            course(3, "410", "Grace Hopper", "Compilers"),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        let courses = catalogue();
        assert_eq!(filter_courses(&courses, &CourseFilter::default()).len(), 3);
    }

    #[test]
    fn fields_match_case_insensitively_by_substring() {
        let courses = catalogue();
        let ids = |f: CourseFilter| {
            filter_courses(&courses, &f).iter().map(|c| c.id).collect::<Vec<_>>()
        };

        assert_eq!(ids(CourseFilter::new("", "HOPPER", "", "")), vec![1, 3]);
        assert_eq!(ids(CourseFilter::new("cs", "hopper", "comp", "")), vec![3]);
        assert_eq!(ids(CourseFilter::new("", "", "", "10")), vec![1, 3]);
        assert!(ids(CourseFilter::new("math", "", "", "")).is_empty());
    }

    #[test]
    fn filter_terms_are_lowercased_once_on_construction() {
        let courses = catalogue();
        let filter = CourseFilter::new("CS", "GRACE", "COMPILERS", "");
        assert_eq!(filter, CourseFilter::new("cs", "grace", "compilers", ""));
        let ids: Vec<u32> = filter_courses(&courses, &filter).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);
    }
}
