pub(crate) mod helpers {
    use lms_core::entities::{Course, Lesson};
    use lms_core::enums::Role;

    use crate::LmsService;
    use crate::inputs::{NewCourse, NewLesson, NewModule, NewUser};

    pub async fn test_service() -> LmsService {
        LmsService::new_local(":memory:").await.unwrap()
    }

    /// A user named `name` with email `<name>@example.com`.
    pub fn new_user(name: &str, role: Role) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "hash.salt".to_string(),
            first_name: None,
            last_name: None,
            role,
            profile_picture: None,
        }
    }

    pub fn new_course(title: &str) -> NewCourse {
        NewCourse {
            title: title.to_string(),
            description: format!("About {title}"),
            thumbnail: None,
            duration: None,
            difficulty: None,
            category_id: None,
        }
    }

    /// A course with one module holding `lessons` lessons.
    pub async fn course_with_lessons(svc: &LmsService, lessons: usize) -> (Course, Vec<Lesson>) {
        let course = svc.create_course(None, &new_course("Course")).await.unwrap();
        let module = svc
            .create_module(&NewModule {
                course_id: course.id,
                title: "Module".into(),
                position: None,
            })
            .await
            .unwrap();

        let mut created = Vec::with_capacity(lessons);
        for i in 0..lessons {
            let lesson = svc
                .create_lesson(&NewLesson {
                    module_id: module.id,
                    title: format!("Lesson {i}"),
                    content: None,
                    video_url: None,
                    duration: None,
                    position: None,
                })
                .await
                .unwrap();
            created.push(lesson);
        }
        (course, created)
    }
}
